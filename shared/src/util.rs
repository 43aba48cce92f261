//! Small shared utilities

use chrono::Utc;

/// Current UNIX timestamp in milliseconds
///
/// All persisted timestamps (order creation, completion, service-call
/// handling) use this representation so range queries compare integers.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_recent() {
        // 2020-01-01 in ms; anything running this test is well past it
        assert!(now_millis() > 1_577_836_800_000);
    }
}
