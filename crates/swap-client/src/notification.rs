use {crate::traits::Notifier, std::time::Duration};

const DEFAULT_DURATION: Duration = Duration::from_secs(3);
const SUCCESS_DURATION: Duration = Duration::from_secs(5);

pub const MISSING_BALANCE: &str = "Could not find balance of token";
pub const REJECTED_TRANSACTION: &str = "Did you rejected the transaction?";
pub const ONLY_ERC20: &str = "Only ERC20 tokens are supported";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";
pub const ORDER_SUBMITTED: &str =
    "Transaction was submitted to the order book network and successful mined";
pub const SWAP_SUBMITTED: &str = "Swap transaction was successfully mined";

/// A message shown to the user for `duration`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub message: String,
    pub duration: Duration,
}

impl Notification {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            duration: DEFAULT_DURATION,
        }
    }

    pub fn success(message: &str) -> Self {
        Self {
            message: message.to_string(),
            duration: SUCCESS_DURATION,
        }
    }
}

/// Shows notifications as log lines, which is what a terminal user sees.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        if notification.duration >= SUCCESS_DURATION {
            tracing::info!(message = %notification.message, "notification");
        } else {
            tracing::warn!(message = %notification.message, "notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_stays_longer() {
        assert!(
            Notification::success(ORDER_SUBMITTED).duration
                > Notification::error(SOMETHING_WENT_WRONG).duration
        );
    }
}
