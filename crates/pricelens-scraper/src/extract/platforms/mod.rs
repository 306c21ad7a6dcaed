//! Built-in extraction profiles, one per supported storefront.

mod amazon;
mod bestbuy;
mod ebay;
mod etsy;
mod generic;
mod shopify;
mod target;
mod walmart;

use pricelens_core::Platform;

use super::profile::ExtractionProfile;

/// Returns the built-in profile for `platform`.
#[must_use]
pub fn profile_for(platform: Platform) -> ExtractionProfile {
    match platform {
        Platform::Amazon => amazon::profile(),
        Platform::Ebay => ebay::profile(),
        Platform::Etsy => etsy::profile(),
        Platform::Walmart => walmart::profile(),
        Platform::Target => target::profile(),
        Platform::BestBuy => bestbuy::profile(),
        Platform::Shopify => shopify::profile(),
        Platform::Generic => generic::profile(),
    }
}
