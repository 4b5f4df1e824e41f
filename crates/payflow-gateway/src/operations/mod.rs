mod digital_river;
mod quickpay;

pub use digital_river::DigitalRiver;
pub use quickpay::Quickpay;
