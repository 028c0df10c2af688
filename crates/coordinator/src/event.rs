//! Lifecycle events and their routing to a delegate.

use common::{TransportOrderId, TransportUnitId};
use serde::{Deserialize, Serialize};

use crate::delegate::TransportOrderStateDelegate;
use crate::error::Result;

/// An event in the life of a transport order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Orders were created for a transport unit.
    Created { transport_unit: TransportUnitId },
    /// An order finished.
    Finished { order_id: TransportOrderId },
    /// An order was canceled.
    Canceled { order_id: TransportOrderId },
    /// An order failed.
    Failed { order_id: TransportOrderId },
    /// An order was interrupted.
    Interrupted { order_id: TransportOrderId },
}

impl LifecycleEvent {
    /// Returns the event name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Created { .. } => "created",
            LifecycleEvent::Finished { .. } => "finished",
            LifecycleEvent::Canceled { .. } => "canceled",
            LifecycleEvent::Failed { .. } => "failed",
            LifecycleEvent::Interrupted { .. } => "interrupted",
        }
    }
}

/// Delivers `event` to the matching callback of `delegate`.
#[tracing::instrument(skip(delegate, event), fields(kind = event.name()))]
pub async fn dispatch<D>(delegate: &D, event: LifecycleEvent) -> Result<()>
where
    D: TransportOrderStateDelegate + ?Sized,
{
    metrics::counter!("lifecycle_events_total", "event" => event.name()).increment(1);

    match event {
        LifecycleEvent::Created { transport_unit } => delegate.after_creation(transport_unit).await,
        LifecycleEvent::Finished { order_id } => delegate.after_finish(order_id).await,
        LifecycleEvent::Canceled { order_id } => delegate.on_cancel(order_id).await,
        LifecycleEvent::Failed { order_id } => delegate.on_failure(order_id).await,
        LifecycleEvent::Interrupted { order_id } => delegate.on_interrupt(order_id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records which callback received which event.
    #[derive(Default)]
    struct RecordingDelegate {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingDelegate {
        async fn record(&self, call: String) -> Result<()> {
            self.calls.lock().await.push(call);
            Ok(())
        }
    }

    #[async_trait]
    impl TransportOrderStateDelegate for RecordingDelegate {
        async fn after_creation(&self, transport_unit: TransportUnitId) -> Result<()> {
            self.record(format!("after_creation:{transport_unit}")).await
        }

        async fn after_finish(&self, order_id: TransportOrderId) -> Result<()> {
            self.record(format!("after_finish:{order_id}")).await
        }

        async fn on_cancel(&self, order_id: TransportOrderId) -> Result<()> {
            self.record(format!("on_cancel:{order_id}")).await
        }

        async fn on_failure(&self, order_id: TransportOrderId) -> Result<()> {
            self.record(format!("on_failure:{order_id}")).await
        }

        async fn on_interrupt(&self, order_id: TransportOrderId) -> Result<()> {
            self.record(format!("on_interrupt:{order_id}")).await
        }
    }

    #[tokio::test]
    async fn test_dispatch_routes_each_event() {
        let delegate = RecordingDelegate::default();
        let unit = TransportUnitId::new();
        let order = TransportOrderId::new();

        let events = [
            LifecycleEvent::Created {
                transport_unit: unit,
            },
            LifecycleEvent::Finished { order_id: order },
            LifecycleEvent::Canceled { order_id: order },
            LifecycleEvent::Failed { order_id: order },
            LifecycleEvent::Interrupted { order_id: order },
        ];
        for event in events {
            dispatch(&delegate, event).await.unwrap();
        }

        let calls = delegate.calls.lock().await;
        assert_eq!(
            *calls,
            vec![
                format!("after_creation:{unit}"),
                format!("after_finish:{order}"),
                format!("on_cancel:{order}"),
                format!("on_failure:{order}"),
                format!("on_interrupt:{order}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_through_trait_object() {
        let delegate: Box<dyn TransportOrderStateDelegate> = Box::new(RecordingDelegate::default());
        dispatch(
            delegate.as_ref(),
            LifecycleEvent::Interrupted {
                order_id: TransportOrderId::new(),
            },
        )
        .await
        .unwrap();
    }

    #[test]
    fn test_event_serialization() {
        let order_id = TransportOrderId::new();
        let event = LifecycleEvent::Finished { order_id };

        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "finished");

        let back: LifecycleEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.name(), "finished");
    }
}
