//! Maps a [`ResolvedLink`] to a [`RouteDecision`]
//!
//! Side effects per surface:
//! - `Unknown` - none
//! - `Web` - none; the web surface handles attribution on its own
//! - `Native` - attribution is forwarded to the SDK every time, even when
//!   absent, and a non-empty code is stored
//!
//! The OS may redeliver the same link on relaunch, so routing a link twice
//! repeats the same side effects and returns the same decision.

use std::sync::Arc;

use slink_core::prelude::*;
use slink_core::{ResolvedLink, RouteDecision, Surface};
use slink_sdk::AttributionSink;

use crate::store::AttributionStore;

pub struct LinkRouter<S> {
    sink: Arc<S>,
    store: Arc<AttributionStore>,
}

impl<S: AttributionSink> LinkRouter<S> {
    pub fn new(sink: Arc<S>, store: Arc<AttributionStore>) -> Self {
        Self { sink, store }
    }

    pub fn route(&self, link: &ResolvedLink) -> RouteDecision {
        match (link.surface(), link.target_url()) {
            (Surface::Web, Some(url)) => {
                info!("Routing to web view: {}", url);
                RouteDecision::OpenWeb {
                    url: url.to_string(),
                }
            }
            (Surface::Native, _) => {
                debug!(
                    "Forwarding attribution: code={:?}, expiry={:?}",
                    link.attribution_code(),
                    link.attribution_expiry()
                );
                self.sink.update_attribution(
                    link.attribution_code().map(str::to_string),
                    link.attribution_expiry().map(str::to_string),
                );

                if let Some(code) = link.attribution_code().filter(|c| !c.is_empty()) {
                    self.store
                        .set(code, link.attribution_expiry().unwrap_or_default());
                }

                info!("Routing to native surface: product={:?}", link.product_id());
                RouteDecision::OpenNative {
                    product_id: link.product_id().map(str::to_string),
                }
            }
            _ => {
                info!("Ignoring link with unknown path");
                RouteDecision::Ignore
            }
        }
    }
}
