use crate::error::Result;
use url::Url;

const PAYMENT_SUCCESS: [&str; 4] = ["success", "completed", "complete", "approved"];
const CHECKOUT_SUCCESS: [&str; 2] = ["completed", "success"];
const STATUS_SUCCESS: [&str; 3] = ["success", "completed", "approved"];

/// What the hosted payment page told us when it sent the browser back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSignal {
    url: Url,
    explicit_success: bool,
    token: Option<String>,
    payer_id: Option<String>,
    transaction_id: Option<String>,
}

impl ReturnSignal {
    pub fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)?;

        let param = |names: &[&str]| -> Option<String> {
            names.iter().find_map(|name| {
                url.query_pairs()
                    .find(|(key, value)| key == name && !value.is_empty())
                    .map(|(_, value)| value.into_owned())
            })
        };
        let status_in = |name: &str, accepted: &[&str]| {
            param(&[name])
                .map(|value| accepted.contains(&value.to_lowercase().as_str()))
                .unwrap_or(false)
        };

        let explicit_success = status_in("payment", &PAYMENT_SUCCESS)
            || status_in("st", &CHECKOUT_SUCCESS)
            || status_in("status", &STATUS_SUCCESS);
        let token = param(&["token"]);
        let payer_id = param(&["PayerID", "payerId", "payerid"]);
        let transaction_id = param(&["tx", "paymentId", "paymentID"]);

        Ok(Self {
            url,
            explicit_success,
            token,
            payer_id,
            transaction_id,
        })
    }

    /// Explicit status flag, or a token echoed with a payer or transaction id.
    ///
    /// The provider does not always send a status parameter, hence the second
    /// form.
    pub fn is_success(&self) -> bool {
        let callback_looks_successful =
            self.token.is_some() && (self.payer_id.is_some() || self.transaction_id.is_some());
        self.explicit_success || callback_looks_successful
    }

    pub fn payer_id(&self) -> Option<&str> {
        self.payer_id.as_deref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// Provider-issued payment id, transaction id first.
    pub fn external_payment_id(&self) -> Option<&str> {
        self.transaction_id().or(self.payer_id())
    }

    /// The return URL with query and fragment removed.
    pub fn cleaned_url(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.to_string()
    }
}
