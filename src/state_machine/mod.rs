//! Bundle lifecycle state machine
//!
//! The transition table is plain data ([`TransitionTable`]); each entry names a
//! [`HandlerTag`] which [`StateMachine::transition`] dispatches to the guards and
//! the [`CascadeEngine`].

pub mod cascade;
pub mod guards;
pub mod table;

pub use cascade::{CascadeEngine, TransitionOutcome};
pub use table::{HandlerTag, TableError, Transition, TransitionTable};

use tracing::Instrument;

use crate::auth::RequestContext;
use crate::error::BundleResult;
use crate::models::{Bundle, State};
use crate::telemetry::create_transition_span;

pub struct StateMachine {
    table: TransitionTable,
    engine: CascadeEngine,
}

impl StateMachine {
    pub fn new(table: TransitionTable, engine: CascadeEngine) -> Self {
        Self { table, engine }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Move `bundle` to `target`, cascading to its content items.
    ///
    /// Table lookups and guards fail before anything is written. Errors raised
    /// once the cascade has started leave earlier writes in place.
    pub async fn transition(
        &self,
        ctx: &RequestContext,
        bundle: &Bundle,
        target: State,
    ) -> BundleResult<TransitionOutcome> {
        let span = create_transition_span(&bundle.id, bundle.state, target, &ctx.correlation_id);

        async move {
            let transition = self.table.resolve(bundle.state, target)?;
            let items = self.engine.content_items(&bundle.id).await?;

            if transition.handler == HandlerTag::Approval {
                guards::ensure_all_content_approved(bundle, &items)?;
            }

            self.engine
                .cascade(ctx, bundle, target, &items, transition.handler.requires_content())
                .await
        }
        .instrument(span)
        .await
    }
}
