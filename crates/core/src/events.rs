//! Notifications for external indexers.

use ark_bn254::Fr;

use crate::field::Address;

/// Event emitted after a successful state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    /// A commitment was appended to the tree.
    DepositRecorded {
        commitment: Fr,
        index: u64,
        root: Fr,
    },
    /// A nullifier hash was consumed.
    WithdrawalRecorded {
        nullifier_hash: Fr,
        recipient: Address,
        relayer: Address,
        fee: u128,
    },
}

/// Receiver of pool events.
pub trait EventSink {
    fn record(&mut self, event: &PoolEvent);
}

impl EventSink for Vec<PoolEvent> {
    fn record(&mut self, event: &PoolEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink> EventSink for std::sync::Arc<std::sync::Mutex<S>> {
    fn record(&mut self, event: &PoolEvent) {
        // A poisoned sink only loses notifications, never pool state
        if let Ok(mut sink) = self.lock() {
            sink.record(event);
        }
    }
}
