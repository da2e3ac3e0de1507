use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Policy engine outcomes by resource kind, action and decision (allow/deny).
    pub static ref AUTHZ_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_authz_decisions_total",
        "Authorization decisions segmented by resource, action and outcome",
        &["resource", "action", "decision"]
    )
    .expect("failed to register blog_authz_decisions_total");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_registered_and_counts() {
        let counter = AUTHZ_DECISIONS_TOTAL.with_label_values(&["blog", "delete", "deny"]);
        let before = counter.get();
        counter.inc();
        assert_eq!(counter.get(), before + 1);

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "blog_authz_decisions_total"));
    }
}
