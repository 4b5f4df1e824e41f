mod mapping;

use payflow_core::{
    AggregationMode, BoundedPoller, CompositeOutcome, History, Lookup, Outcome, Params, Sleeper,
    StepFault, StepSequencer, ThreadSleeper,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use self::mapping::{
    ACCEPTED, Charge, Customer, Fulfillment, Order, Source, customer_body, fulfillment_items,
    rejection,
};
use crate::config::GatewayConfig;
use crate::model::{CustomerDetails, CustomerRef};
use crate::providers::HttpTransport;
use crate::traits::{HeaderSource, Headers, Method, RawResponse, Transport};

type Call = Result<Outcome, StepFault>;

/// Something that stopped a settlement poll early.
enum Interrupt {
    Rejected(Outcome),
    Fault(StepFault),
}

impl From<StepFault> for Interrupt {
    fn from(fault: StepFault) -> Self {
        Self::Fault(fault)
    }
}

/// Digital River customer vaulting and order completion.
pub struct DigitalRiver<T, S = ThreadSleeper> {
    transport: T,
    headers: Headers,
    poller: BoundedPoller<S>,
}

impl DigitalRiver<HttpTransport> {
    /// # Errors
    ///
    /// Returns an error if the `[digital_river]` section is missing, the poll
    /// budget is invalid, or the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> crate::Result<Self> {
        let provider = config.digital_river()?;
        let transport =
            HttpTransport::new(provider.base_url(config.mode()), config.http().timeout())?;
        Ok(Self::new(transport, provider.headers(), config.poll().poller()?))
    }
}

impl<T: Transport, S: Sleeper> DigitalRiver<T, S> {
    pub fn new(transport: T, headers: Headers, poller: BoundedPoller<S>) -> Self {
        Self {
            transport,
            headers,
            poller,
        }
    }

    /// Vaults `source_id` on a customer.
    ///
    /// An existing customer is checked first and nothing is attached if it
    /// does not exist; otherwise a customer is created and the source is
    /// attached to whatever id the provider assigned.
    pub fn store(&self, source_id: &str, customer: &CustomerRef) -> CompositeOutcome {
        let sequencer = StepSequencer::new(AggregationMode::AllMustSucceed);
        let sequencer = match customer {
            CustomerRef::Existing(id) => {
                sequencer.step("check_customer", move |_| self.check_customer(id))
            }
            CustomerRef::New(details) => {
                sequencer.step("create_customer", move |_| self.create_customer(details))
            }
        };

        sequencer
            .step("attach_source", move |history| {
                self.attach_source(history, source_id)
            })
            .run()
    }

    /// Turns a checkout into a fulfilled order and waits for the resulting
    /// capture to show up.
    pub fn purchase(&self, checkout_id: &str) -> CompositeOutcome {
        StepSequencer::new(AggregationMode::AllMustSucceed)
            .step("create_order", move |_| self.create_order(checkout_id))
            .step("create_fulfillment", |history| self.create_fulfillment(history))
            .step("capture_lookup", |history| self.capture_lookup(history))
            .run()
    }

    fn check_customer(&self, id: &str) -> Call {
        let outcome = self.find_customer(id)?.into_outcome(
            |customer| {
                Outcome::new(true, "Customer found", Params::new(), None)
                    .with_param("exists", true)
                    .with_authorization(customer.id)
            },
            format!("Customer '{id}' not found"),
        );

        if outcome.succeeded() {
            Ok(outcome)
        } else {
            Ok(outcome.with_param("exists", false))
        }
    }

    fn find_customer(&self, id: &str) -> Result<Lookup<Customer>, StepFault> {
        let response = self.send(Method::Get, &format!("/customers/{id}"), None)?;
        if !response.is_success() {
            debug!(customer = id, status = response.status, "customer lookup missed");
            return Ok(Lookup::NotFound);
        }
        Ok(Lookup::Found(response.decode()?))
    }

    fn create_customer(&self, details: &CustomerDetails) -> Call {
        let response = self.send(Method::Post, "/customers", Some(&customer_body(details)))?;
        if !response.is_success() {
            return Ok(rejection(&response));
        }

        let customer: Customer = response.decode()?;
        Ok(Outcome::success(Params::new())
            .with_param("customer_vault_token", customer.id.clone())
            .with_authorization(customer.id))
    }

    fn attach_source(&self, history: &History<'_>, source_id: &str) -> Call {
        let Some(customer_id) = history.last_authorization() else {
            return Ok(Outcome::failure(
                "no customer to attach the source to",
                Params::new(),
            ));
        };

        let path = format!("/customers/{customer_id}/sources/{source_id}");
        let response = self.send(Method::Post, &path, None)?;
        if !response.is_success() {
            return Ok(rejection(&response));
        }

        let source: Source = response.decode()?;
        Ok(Outcome::success(Params::new())
            .with_param("customer_vault_token", source.customer_id.clone())
            .with_param("payment_profile_token", source.id)
            .with_authorization(source.customer_id))
    }

    fn create_order(&self, checkout_id: &str) -> Call {
        let body = json!({ "checkoutId": checkout_id });
        let response = self.send(Method::Post, "/orders", Some(&body))?;
        if !response.is_success() {
            return Ok(rejection(&response));
        }

        let order: Order = response.decode()?;
        Ok(Outcome::success(Params::new())
            .with_param("order_id", order.id.clone())
            .with_param("order_state", order.state)
            .with_param("items", fulfillment_items(&order.items))
            .with_authorization(order.id))
    }

    fn create_fulfillment(&self, history: &History<'_>) -> Call {
        let Some(order) = history.outcome("create_order") else {
            return Ok(Outcome::failure("no order to fulfill", Params::new()));
        };
        let order_id = order.authorization().unwrap_or_default();
        let state = order.param_str("order_state").unwrap_or_default();

        if state != ACCEPTED {
            debug!(order_id, state = %state, "order not accepted, skipping fulfillment");
            return Ok(Outcome::failure("Order not in 'accepted' state", Params::new())
                .with_param("order_id", order_id)
                .with_param("order_state", state)
                .with_authorization(order_id));
        }

        let items = order
            .param("items")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let body = json!({ "orderId": order_id, "items": items });
        let response = self.send(Method::Post, "/fulfillments", Some(&body))?;
        if !response.is_success() {
            return Ok(rejection(&response));
        }

        let fulfillment: Fulfillment = response.decode()?;
        Ok(Outcome::success(Params::new()).with_param("fulfillment_id", fulfillment.id))
    }

    fn capture_lookup(&self, history: &History<'_>) -> Call {
        let Some(order_id) = history
            .outcome("create_order")
            .and_then(Outcome::authorization)
        else {
            return Ok(Outcome::failure("no order to look up", Params::new()));
        };

        match self.find_capture(order_id) {
            Ok(outcome) | Err(Interrupt::Rejected(outcome)) => Ok(outcome),
            Err(Interrupt::Fault(fault)) => Err(fault),
        }
    }

    /// Charges and captures are created asynchronously after fulfillment, so
    /// both are polled for within the configured budget. Only the first
    /// charge of an order is considered.
    fn find_capture(&self, order_id: &str) -> Result<Outcome, Interrupt> {
        let order = self
            .poller
            .try_poll(|| {
                let order: Order = self.fetch(&format!("/orders/{order_id}"))?;
                let settled = !order.charges.is_empty();
                Ok::<_, Interrupt>((order, settled))
            })?
            .into_value();

        let Some(order_charge) = order.charges.into_iter().next() else {
            return Ok(Outcome::failure("charge not found", Params::new())
                .with_param("order_id", order_id));
        };

        let charge = self
            .poller
            .try_poll(|| {
                let charge: Charge = self.fetch(&format!("/charges/{}", order_charge.id))?;
                let settled = !charge.captures.is_empty();
                Ok::<_, Interrupt>((charge, settled))
            })?
            .into_value();

        let Some(capture) = charge.captures.first() else {
            return Ok(Outcome::failure("capture not found", Params::new())
                .with_param("order_id", order_id)
                .with_param("charge_id", charge.id));
        };

        debug!(order_id, charge = %charge.id, capture = %capture.id, "capture settled");
        Ok(Outcome::success(Params::new())
            .with_param("order_id", order_id)
            .with_param("charge_id", charge.id.clone())
            .with_param("capture_id", capture.id.clone())
            .with_param("source_id", order_charge.source_id.or(charge.source_id.clone()))
            .with_authorization(capture.id.clone()))
    }

    fn fetch<R: DeserializeOwned>(&self, path: &str) -> Result<R, Interrupt> {
        let response = self.send(Method::Get, path, None)?;
        if !response.is_success() {
            return Err(Interrupt::Rejected(rejection(&response)));
        }
        Ok(response.decode()?)
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RawResponse, StepFault> {
        Ok(self.transport.call(method, path, body, &self.headers)?)
    }
}
