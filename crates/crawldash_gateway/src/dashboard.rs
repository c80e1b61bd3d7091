use std::sync::Arc;

use crawldash_core::{update, AppState, AppViewModel, Msg};
use crawldash_logging::dash_debug;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};

use crate::effects::execute;
use crate::CrawlerGateway;

/// Single-threaded driver: messages are applied immediately, gateway calls
/// run concurrently and are folded back in the order they settle.
///
/// Nothing is cancelled or timed out here; a call stays in flight until the
/// gateway answers.
pub struct Dashboard {
    state: AppState,
    gateway: Arc<dyn CrawlerGateway>,
    in_flight: FuturesUnordered<BoxFuture<'static, Msg>>,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn CrawlerGateway>, state: AppState) -> Self {
        Self {
            state,
            gateway,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    /// Calls issued and not yet folded back.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Apply `msg` (including any optimistic change) and queue the calls it asks for.
    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        for effect in effects {
            dash_debug!("Queued gateway call {:?}", effect);
            let gateway = Arc::clone(&self.gateway);
            self.in_flight
                .push(async move { execute(gateway.as_ref(), effect).await }.boxed());
        }
    }

    /// Wait for the next call to settle and fold its result in.
    /// Returns `false` when nothing was in flight.
    pub async fn settle_next(&mut self) -> bool {
        match self.in_flight.next().await {
            Some(completion) => {
                self.dispatch(completion);
                true
            }
            None => false,
        }
    }

    /// Settle everything, including follow-up calls such as refreshes.
    pub async fn settle_all(&mut self) {
        while self.settle_next().await {}
    }

    /// Dispatch and wait until the state is quiescent.
    pub async fn run(&mut self, msg: Msg) {
        self.dispatch(msg);
        self.settle_all().await;
    }
}
