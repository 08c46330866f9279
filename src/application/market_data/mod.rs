pub mod candle_aggregator;
pub mod engine;
pub mod price_process;
