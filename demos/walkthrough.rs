// SPDX-License-Identifier: MIT

//! End-to-end tour of the flag registry.
//!
//! Run with:
//!
//! ```sh
//! cargo run -p flagship-std --example walkthrough
//! ```

use flagship_core::{Config, Environments, FeatureFlags, Flag, FlagError};
use flagship_std::{report, ProcessEnvSource};

fn main() -> Result<(), FlagError> {
    // Declare flags up front.  The wrap call validates the whole set and
    // refuses a registry with undescribed or policy-less flags.
    let mut features = FeatureFlags::wrap(
        Config::new()
            .flag(
                "checkout_v2",
                Flag::new("the redesigned checkout funnel").enabled(true),
            )
            .flag(
                "beta_search",
                Flag::new("search rewrite, dev only for now")
                    .per_environment([("dev", true), ("qa", false)]),
            )
            .flag(
                "holiday_banner",
                Flag::new("seasonal banner, activated from the outside")
                    .per_environment([("dev", true)])
                    .environment_flag("HOLIDAY_BANNER"),
            )
            .environments(Environments::new(["dev", "qa"], "qa"))
            .source(ProcessEnvSource),
    )?;

    // Plain queries.
    println!("checkout_v2:    {}", features.is_enabled("checkout_v2")?);
    println!("beta_search:    {}", features.is_enabled("beta_search")?);

    // holiday_banner has no qa entry, so it is undetermined here and falls
    // through to the process-env source.  Try:
    //   HOLIDAY_BANNER=1 cargo run -p flagship-std --example walkthrough
    println!("holiday_banner: {}", features.is_enabled("holiday_banner")?);

    // Scoped toggle: pinned on for the closure, restored afterwards even if
    // the closure panics.
    features.enabling("beta_search", |features| {
        println!(
            "beta_search while enabling: {}",
            features.is_enabled("beta_search").unwrap()
        );
    })?;
    println!("beta_search after:          {}", features.is_enabled("beta_search")?);

    // Test box: batch overrides with an explicit rollback.
    let mut box_ = features.test_box();
    box_.enable("beta_search")?;
    box_.disable("checkout_v2")?;
    println!("\nwhile the box is open:\n{}", report::summary(&box_.state()));
    box_.reset();

    println!("after reset:\n{}", report::summary_of(&features));

    Ok(())
}
