pub mod demo_feed;
pub mod history_export;
pub mod history_store;
pub mod history_view;
pub mod http_client;
pub mod list_view;
pub mod next_game;
pub mod pipeline;
pub mod prediction_fetch;
pub mod schedule_fetch;
pub mod state;
pub mod stats_fetch;
