// Tile service - Independent per-tile data loading and progressive streaming
use crate::application::widget_registry::{FetchContext, WidgetRegistry};
use crate::domain::tile::{StreamMessage, TileData, TileState};
use crate::domain::widget::{Layout, WidgetInstance};
use crate::infrastructure::config::{BackendSettings, WeatherSettings};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub const SYNC_ERROR: &str = "Sync Error";
pub const TIMEOUT_ERROR: &str = "Timed Out";

#[derive(Clone)]
pub struct TileService {
    registry: Arc<WidgetRegistry>,
    client: reqwest::Client,
    backends: BackendSettings,
    weather: WeatherSettings,
    timeout: Duration,
}

impl TileService {
    pub fn new(
        registry: Arc<WidgetRegistry>,
        client: reqwest::Client,
        backends: BackendSettings,
        weather: WeatherSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            client,
            backends,
            weather,
            timeout,
        }
    }

    /// Fetch context with backend URLs resolved against the requesting host.
    pub fn context_for(&self, host: &str) -> FetchContext {
        FetchContext {
            client: self.client.clone(),
            endpoints: self.backends.resolve(host),
            weather: self.weather.clone(),
        }
    }

    /// Load one tile. Never fails: problems become the tile's error state.
    pub async fn load_tile(&self, widget: &WidgetInstance, ctx: &FetchContext) -> TileData {
        let state = match self.registry.lookup(&widget.widget_type) {
            None => TileState::Unknown,
            Some(module) => {
                match tokio::time::timeout(self.timeout, module.source.load(ctx)).await {
                    Ok(Ok(body)) => TileState::Ready { body },
                    Ok(Err(e)) => {
                        tracing::warn!(
                            "Error fetching tile {} ({}): {:#}",
                            widget.id,
                            widget.widget_type,
                            e
                        );
                        TileState::Error {
                            message: SYNC_ERROR.to_string(),
                        }
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Tile {} ({}) timed out after {:?}",
                            widget.id,
                            widget.widget_type,
                            self.timeout
                        );
                        TileState::Error {
                            message: TIMEOUT_ERROR.to_string(),
                        }
                    }
                }
            }
        };

        TileData {
            id: widget.id.clone(),
            widget_type: widget.widget_type.clone(),
            state,
        }
    }

    /// Stream a whole dashboard: a skeleton first, then one update per tile as
    /// each fetch finishes, then a completion event.
    pub async fn stream_dashboard(
        &self,
        layout: Layout,
        host: &str,
    ) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(100);
        let start_time = Instant::now();
        let ctx = Arc::new(self.context_for(host));

        // 1. Skeleton: known tiles loading, unknown ones resolved immediately
        let skeleton: Vec<TileData> = layout
            .iter()
            .map(|w| TileData {
                id: w.id.clone(),
                widget_type: w.widget_type.clone(),
                state: if self.registry.contains(&w.widget_type) {
                    TileState::Loading
                } else {
                    TileState::Unknown
                },
            })
            .collect();
        let total_tiles = skeleton.len();
        let _ = tx.send(StreamMessage::Skeleton { tiles: skeleton }).await;

        // 2. One task per known tile
        let mut handles = Vec::new();
        for widget in layout {
            if !self.registry.contains(&widget.widget_type) {
                continue;
            }

            let tx = tx.clone();
            let service = self.clone();
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                let tile = service.load_tile(&widget, &ctx).await;
                let failed = tile.state.is_error();
                let _ = tx.send(StreamMessage::TileUpdate { tile }).await;
                failed
            }));
        }

        // 3. Completion once every tile has reported
        tokio::spawn(async move {
            let failed = futures::future::join_all(handles)
                .await
                .into_iter()
                .filter(|r| !matches!(r, Ok(false)))
                .count();

            let duration_ms = start_time.elapsed().as_millis() as u64;
            tracing::debug!(
                "Dashboard stream finished: {} tiles, {} failed, {}ms",
                total_tiles,
                failed,
                duration_ms
            );
            let _ = tx
                .send(StreamMessage::Complete {
                    total_tiles,
                    failed,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}
