//! Fuzz test for tea shop order handling
//!
//! Feeds arbitrary tea names through both unknown-key policies and checks
//! that serving never panics and the report stays consistent.
//!
//! Run with: cargo +nightly fuzz run order_fuzz -- -max_total_time=60

#![no_main]

use canon_core::UnknownKeyPolicy;
use canon_teashop::{ShopConfig, TeaShop};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    for policy in [
        UnknownKeyPolicy::Reject,
        UnknownKeyPolicy::Fallback("karak".to_string()),
    ] {
        let config = ShopConfig {
            unknown_key_policy: policy.clone(),
            ..Default::default()
        };
        let Ok(shop) = TeaShop::from_config(&config) else {
            panic!("default config with {:?} must be valid", policy);
        };

        let mut orders = 0u64;
        for (table, tea) in input.split(',').enumerate() {
            let result = shop.serve(table as u32, tea);
            orders += 1;
            if matches!(policy, UnknownKeyPolicy::Fallback(_)) {
                assert!(result.is_ok(), "fallback must serve '{}'", tea);
            } else if let Err(err) = result {
                assert!(err.is_unknown_key(), "unexpected error {}", err);
            }
        }

        let report = shop.report();
        assert_eq!(report.total_requests, orders);
        assert!(report.distinct_keys <= 2);
        assert!(report.distinct_keys as u64 <= report.total_requests);
    }
});
