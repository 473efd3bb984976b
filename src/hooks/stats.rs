//! Dashboard aggregates for the signed-in user.

use chrono::Duration;

use crate::api::stats;
use crate::api::types::Stats;
use crate::context::AppContext;
use crate::query::Query;

use super::keys;

/// Aggregates move with every item mutation, so they go stale quickly.
const STATS_STALE_SECS: i64 = 10;

pub struct StatsHooks<'a> {
  ctx: &'a AppContext,
}

impl<'a> StatsHooks<'a> {
  pub(crate) fn new(ctx: &'a AppContext) -> Self {
    Self { ctx }
  }

  pub fn get(&self) -> Query<Stats> {
    let transport = self.ctx.transport.clone();
    Query::new(&self.ctx.queries, keys::stats(), move || {
      let transport = transport.clone();
      async move { stats::get(transport.as_ref()).await }
    })
    .with_stale_time(Duration::seconds(STATS_STALE_SECS))
    .enabled(self.ctx.signed_in())
  }
}
