//! Property-based tests for the load tolerance rule

use agentaflow_healthcheck::LoadBurstResult;
use proptest::prelude::*;

proptest! {
    /// 許容件数 floor(total * ratio) ちょうどまでは合格
    #[test]
    fn failures_up_to_budget_pass(total in 1u32..1_000, percent in 0u32..=100) {
        let ratio = f64::from(percent) / 100.0;
        let budget = (u64::from(total) * u64::from(percent) / 100) as u32;
        let result = LoadBurstResult::new(total, budget);
        prop_assert!(!result.exceeds_tolerance(ratio));
    }

    /// 許容件数を1件でも超えたら不合格
    #[test]
    fn one_failure_over_budget_fails(total in 1u32..1_000, percent in 0u32..100) {
        let ratio = f64::from(percent) / 100.0;
        let budget = (u64::from(total) * u64::from(percent) / 100) as u32;
        let result = LoadBurstResult::new(total, budget + 1);
        prop_assert!(result.exceeds_tolerance(ratio));
    }

    /// 失敗件数は総数を超えない
    #[test]
    fn failure_count_never_exceeds_total(total in 0u32..1_000, failures in 0u32..2_000) {
        let result = LoadBurstResult::new(total, failures);
        prop_assert!(result.failure_count <= result.total_requests);
        prop_assert_eq!(result.success_count() + result.failure_count, total);
    }
}
