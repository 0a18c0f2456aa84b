//! Discovery feeds.
//!
//! Each backend's discovery library announces devices on its own channel.
//! The library side holds a [`DiscoveryAnnouncer`]; the controller consumes
//! the matching [`DiscoveryFeeds`] once, in `init`, with one forwarder task
//! per backend that registers every announced device with its adapter.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adapters::AdapterSet;
use crate::devices::{AirPlayDevice, ChromecastDevice, DlnaDevice};
use crate::runtime::{TaskSpawner, TokioSpawner};

type Feed<D> = mpsc::UnboundedReceiver<Arc<D>>;

/// Sending half of the discovery channels, handed to the discovery libraries.
#[derive(Clone)]
pub struct DiscoveryAnnouncer {
    chromecast: mpsc::UnboundedSender<Arc<dyn ChromecastDevice>>,
    airplay: mpsc::UnboundedSender<Arc<dyn AirPlayDevice>>,
    dlna: mpsc::UnboundedSender<Arc<dyn DlnaDevice>>,
}

impl DiscoveryAnnouncer {
    /// Announces a Chromecast receiver. Returns `false` once the controller
    /// has shut down.
    pub fn chromecast(&self, device: Arc<dyn ChromecastDevice>) -> bool {
        self.chromecast.send(device).is_ok()
    }

    pub fn airplay(&self, device: Arc<dyn AirPlayDevice>) -> bool {
        self.airplay.send(device).is_ok()
    }

    pub fn dlna(&self, device: Arc<dyn DlnaDevice>) -> bool {
        self.dlna.send(device).is_ok()
    }
}

/// Receiving half of the discovery channels, consumed by `CastController::init`.
pub struct DiscoveryFeeds {
    chromecast: Feed<dyn ChromecastDevice>,
    airplay: Feed<dyn AirPlayDevice>,
    dlna: Feed<dyn DlnaDevice>,
}

/// Creates a connected announcer/feeds pair.
#[must_use]
pub fn discovery_channels() -> (DiscoveryAnnouncer, DiscoveryFeeds) {
    let (chromecast_tx, chromecast_rx) = mpsc::unbounded_channel();
    let (airplay_tx, airplay_rx) = mpsc::unbounded_channel();
    let (dlna_tx, dlna_rx) = mpsc::unbounded_channel();
    (
        DiscoveryAnnouncer {
            chromecast: chromecast_tx,
            airplay: airplay_tx,
            dlna: dlna_tx,
        },
        DiscoveryFeeds {
            chromecast: chromecast_rx,
            airplay: airplay_rx,
            dlna: dlna_rx,
        },
    )
}

impl DiscoveryFeeds {
    pub(crate) fn spawn_forwarders(
        self,
        spawner: &TokioSpawner,
        token: &CancellationToken,
        adapters: &AdapterSet,
    ) {
        let chromecast = Arc::clone(&adapters.chromecast);
        forward(spawner, token, "Chromecast", self.chromecast, move |device| {
            chromecast.add_device(device);
        });

        let airplay = Arc::clone(&adapters.airplay);
        forward(spawner, token, "AirPlay", self.airplay, move |device| {
            airplay.add_device(device);
        });

        let dlna = Arc::clone(&adapters.dlna);
        forward(spawner, token, "DLNA", self.dlna, move |device| {
            dlna.add_device(device);
        });
    }
}

fn forward<D, F>(
    spawner: &TokioSpawner,
    token: &CancellationToken,
    source: &'static str,
    mut feed: Feed<D>,
    register: F,
) where
    D: ?Sized + Send + Sync + 'static,
    F: Fn(Arc<D>) + Send + 'static,
{
    spawner.spawn_cancellable(token.clone(), async move {
        while let Some(device) = feed.recv().await {
            register(device);
        }
        log::debug!("[Discovery] {} feed closed", source);
    });
}
