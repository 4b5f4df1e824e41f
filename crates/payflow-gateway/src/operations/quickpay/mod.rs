mod mapping;

use payflow_core::{
    AggregationMode, CompositeOutcome, History, Outcome, Params, Ready, StepFault, StepSequencer,
};
use serde_json::{Value, json};

use self::mapping::{
    card_body, interpret, payment_body, subscription_authorize_body, subscription_body,
    synchronized, token_body,
};
use crate::config::GatewayConfig;
use crate::model::{Card, Money, OrderDetails, PaymentInput, Subscription};
use crate::providers::HttpTransport;
use crate::traits::{HeaderSource, Headers, Method, Transport};

type Call = Result<Outcome, StepFault>;

/// Amount authorized, then voided, to check that a card is usable.
const VERIFY_AMOUNT: u64 = 100;

/// Quickpay v10 payments and card vaulting.
pub struct Quickpay<T> {
    transport: T,
    headers: Headers,
}

impl Quickpay<HttpTransport> {
    /// # Errors
    ///
    /// Returns an error if the `[quickpay]` section is missing or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> crate::Result<Self> {
        let provider = config.quickpay()?;
        let transport = HttpTransport::new(provider.base_url(), config.http().timeout())?;
        Ok(Self::new(transport, provider.headers()))
    }
}

impl<T: Transport> Quickpay<T> {
    pub fn new(transport: T, headers: Headers) -> Self {
        Self { transport, headers }
    }

    pub fn authorize(
        &self,
        money: &Money,
        payment: &PaymentInput,
        order: &OrderDetails,
    ) -> CompositeOutcome {
        self.payment_steps(money, payment, order, None).run()
    }

    /// Authorizes without auto capture, then captures the full amount.
    pub fn purchase(
        &self,
        money: &Money,
        payment: &PaymentInput,
        order: &OrderDetails,
    ) -> CompositeOutcome {
        self.payment_steps(money, payment, order, Some(false))
            .step("capture_payment", move |history| {
                match created_payment_id(history) {
                    Some(payment_id) => self.capture_call(&payment_id, money),
                    None => Ok(Outcome::failure("no payment to capture", Params::new())),
                }
            })
            .run()
    }

    pub fn capture(&self, money: &Money, payment_id: &str) -> CompositeOutcome {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("capture_payment", move |_| self.capture_call(payment_id, money))
            .run()
    }

    pub fn void(&self, payment_id: &str) -> CompositeOutcome {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("void_payment", move |_| self.void_call(payment_id))
            .run()
    }

    /// Returns `money` of a captured payment to the card.
    pub fn refund(&self, money: &Money, payment_id: &str) -> CompositeOutcome {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("refund_payment", move |_| {
                let path = synchronized(&format!("/payments/{payment_id}/refund"));
                self.commit(&path, &json!({ "amount": money.amount() }))
            })
            .run()
    }

    /// Authorizes a small amount and voids it again.
    ///
    /// The verdict is the authorization's; a failed void is recorded but
    /// does not change it.
    pub fn verify(&self, card: &Card, currency: &str, order: &OrderDetails) -> CompositeOutcome {
        let money = Money::new(VERIFY_AMOUNT, currency);
        let payment = PaymentInput::NewInstrument(card.clone());

        StepSequencer::new(AggregationMode::FirstDetermines)
            .pin_authorization_to_primary()
            .step("authorize", move |_| {
                Ok(self.authorize(&money, &payment, order).to_outcome())
            })
            .cleanup_step("void_payment", |history| match history.last_authorization() {
                Some(payment_id) => self.void_call(payment_id),
                None => Ok(Outcome::failure("no payment to void", Params::new())),
            })
            .run()
    }

    /// Creates a vaulted card and authorizes it for later use.
    pub fn store(&self, card: &Card) -> CompositeOutcome {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("create_card", |_| self.commit("/cards", &json!({})))
            .step("authorize_card", move |history| {
                let Some(card_id) = history.last_authorization() else {
                    return Ok(Outcome::failure("no card to authorize", Params::new()));
                };
                let path = synchronized(&format!("/cards/{card_id}/authorize"));
                self.commit(&path, &json!({ "card": card_body(card) }))
            })
            .run()
    }

    /// Creates a subscription and authorizes the card against it; the
    /// subscription id is the handle for later recurring charges.
    pub fn store_subscription(&self, card: &Card, subscription: &Subscription) -> CompositeOutcome {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("create_subscription", move |_| {
                self.commit("/subscriptions", &subscription_body(subscription))
            })
            .step("authorize_subscription", move |history| {
                let Some(subscription_id) = history.last_authorization() else {
                    return Ok(Outcome::failure("no subscription to authorize", Params::new()));
                };
                let path = synchronized(&format!("/subscriptions/{subscription_id}/authorize"));
                self.commit(&path, &subscription_authorize_body(subscription, card))
            })
            .run()
    }

    /// Removes a vaulted card.
    pub fn unstore(&self, card_id: &str) -> CompositeOutcome {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("cancel_card", move |_| {
                let path = synchronized(&format!("/cards/{card_id}/cancel"));
                self.commit(&path, &json!({}))
            })
            .run()
    }

    fn payment_steps<'a>(
        &'a self,
        money: &'a Money,
        payment: &'a PaymentInput,
        order: &'a OrderDetails,
        auto_capture: Option<bool>,
    ) -> StepSequencer<'a, Ready<'a>> {
        let sequencer = StepSequencer::new(AggregationMode::AllMustSucceed);
        let sequencer = match payment {
            PaymentInput::ExistingHandle(card_id) => sequencer
                .step("create_token", move |_| {
                    let path = synchronized(&format!("/cards/{card_id}/tokens"));
                    self.commit(&path, &json!({}))
                })
                .step("create_payment", move |_| {
                    self.commit("/payments", &payment_body(money, order))
                }),
            PaymentInput::NewInstrument(_) => sequencer.step("create_payment", move |_| {
                self.commit("/payments", &payment_body(money, order))
            }),
        };

        sequencer.step("authorize_payment", move |history| {
            self.authorize_payment(history, money, payment, auto_capture)
        })
    }

    fn authorize_payment(
        &self,
        history: &History<'_>,
        money: &Money,
        payment: &PaymentInput,
        auto_capture: Option<bool>,
    ) -> Call {
        let Some(payment_id) = created_payment_id(history) else {
            return Ok(Outcome::failure("no payment to authorize", Params::new()));
        };
        let card = match payment {
            PaymentInput::ExistingHandle(_) => {
                match history.outcome("create_token").and_then(Outcome::authorization) {
                    Some(token) => token_body(token),
                    None => return Ok(Outcome::failure("no card token", Params::new())),
                }
            }
            PaymentInput::NewInstrument(card) => card_body(card),
        };

        let mut body = json!({ "amount": money.amount(), "card": card });
        if let Some(auto_capture) = auto_capture {
            body["auto_capture"] = Value::Bool(auto_capture);
        }
        self.commit(&synchronized(&format!("/payments/{payment_id}/authorize")), &body)
    }

    fn capture_call(&self, payment_id: &str, money: &Money) -> Call {
        let path = synchronized(&format!("/payments/{payment_id}/capture"));
        self.commit(&path, &json!({ "amount": money.amount() }))
    }

    fn void_call(&self, payment_id: &str) -> Call {
        let path = synchronized(&format!("/payments/{payment_id}/cancel"));
        self.commit(&path, &json!({}))
    }

    fn commit(&self, path: &str, body: &Value) -> Call {
        let response = self
            .transport
            .call(Method::Post, path, Some(body), &self.headers)?;
        let parsed = response.json_object()?;
        Ok(interpret(response.is_success(), Value::Object(parsed)))
    }
}

fn created_payment_id(history: &History<'_>) -> Option<String> {
    history
        .outcome("create_payment")
        .and_then(|payment| payment.param_str("id"))
}
