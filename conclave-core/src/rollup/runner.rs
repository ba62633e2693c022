//! Finish → handle → publish loop against a [`RollupClient`].

use std::time::Duration;

use crate::rollup::client::RollupClient;
use crate::rollup::handler::DappHandler;
use crate::rollup::payload;
use crate::rollup::types::{FinishStatus, Output};

/// Result of one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The server had nothing pending.
    Idle,
    /// A request was handled; the next finish carries this status.
    Handled(FinishStatus),
    /// The server could not be reached; the caller should back off.
    TransportError,
}

pub struct Runner<C: RollupClient> {
    client: C,
    handler: DappHandler,
    status: FinishStatus,
    retry_delay: Duration,
}

impl<C: RollupClient> Runner<C> {
    pub fn new(client: C, handler: DappHandler, retry_delay: Duration) -> Self {
        Runner {
            client,
            handler,
            status: FinishStatus::Accept,
            retry_delay,
        }
    }

    pub fn handler(&self) -> &DappHandler {
        &self.handler
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Status the next finish call will report.
    pub fn pending_status(&self) -> FinishStatus {
        self.status
    }

    fn publish(&mut self, outputs: Vec<Output>) -> Result<(), String> {
        for out in outputs {
            let sent = match out {
                Output::Notice(json) => self.client.send_notice(&payload::encode(&json)),
                Output::Report(json) => self.client.send_report(&payload::encode(&json)),
            };
            sent.map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn step(&mut self) -> StepOutcome {
        log::debug!("Sending finish");
        let request = match self.client.finish(self.status) {
            Ok(Some(r)) => r,
            Ok(None) => {
                log::debug!("No pending rollup request, trying again");
                return StepOutcome::Idle;
            }
            Err(crate::rollup::RollupError::InvalidResponse(e)) => {
                log::error!("Could not parse rollup request: {}", e);
                self.status = FinishStatus::Reject;
                return StepOutcome::Handled(self.status);
            }
            Err(e) => {
                log::error!("Error making http request: {}", e);
                return StepOutcome::TransportError;
            }
        };

        self.status = match self.handler.handle(&request) {
            Ok(outputs) => match self.publish(outputs) {
                Ok(()) => FinishStatus::Accept,
                Err(e) => {
                    log::error!("Failed to publish output: {}", e);
                    FinishStatus::Reject
                }
            },
            Err(e) => {
                log::warn!("Request rejected: {}", e);
                FinishStatus::Reject
            }
        };
        StepOutcome::Handled(self.status)
    }

    /// Serve forever.
    pub fn run(&mut self) -> ! {
        log::info!("Rollup runner started");
        loop {
            if self.step() == StepOutcome::TransportError {
                std::thread::sleep(self.retry_delay);
            }
        }
    }
}
