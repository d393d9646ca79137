//! Fuzz test for tea shop configuration parsing
//!
//! Arbitrary TOML must either fail to parse, fail validation, or yield a
//! config that opens a working shop.
//!
//! Run with: cargo +nightly fuzz run config_fuzz -- -max_total_time=60

#![no_main]

use canon_teashop::{ShopConfig, TeaShop};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = ShopConfig::from_toml_str(input) else {
        return;
    };
    if config.validate().is_err() {
        assert!(TeaShop::from_config(&config).is_err());
        return;
    }

    let shop = match TeaShop::from_config(&config) {
        Ok(shop) => shop,
        Err(err) => panic!("validated config refused: {}", err),
    };
    for tea in &config.menu {
        assert!(shop.serve(1, tea.as_str()).is_ok(), "menu tea '{}' refused", tea);
    }
    let report = shop.report();
    assert_eq!(report.total_requests, config.menu.len() as u64);
});
