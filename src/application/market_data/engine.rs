use crate::application::market_data::candle_aggregator::CandleAggregator;
use crate::application::market_data::price_process::PriceProcess;
use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

/// The public simulation tick: one stochastic price step folded into every
/// timeframe's candle series.
///
/// The engine owns the random generator, so a fixed seed reproduces the whole
/// market, candles included.
pub struct MarketEngine {
    process: PriceProcess,
    aggregator: CandleAggregator,
    rng: StdRng,
}

impl MarketEngine {
    /// Builds the engine around a seed price, bootstrapping candle history
    /// for every timeframe. `rng_seed` pins the market path for tests;
    /// `None` draws a fresh seed from the OS.
    pub fn new(seed_price: f64, now_ms: i64, rng_seed: Option<u64>) -> Self {
        let mut rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let process = PriceProcess::new(seed_price, &mut rng);
        let aggregator = CandleAggregator::new(seed_price, now_ms, process.volatility(), &mut rng);

        info!(
            seed_price,
            seeded = rng_seed.is_some(),
            "MarketEngine: initialized with bootstrapped candle history"
        );

        Self {
            process,
            aggregator,
            rng,
        }
    }

    /// Advances the price by `dt` seconds and updates every candle series.
    /// Returns the new price.
    pub fn tick(&mut self, now_ms: i64, dt: f64) -> f64 {
        let price = self.process.advance(dt, &mut self.rng);
        self.aggregator.on_tick(price, now_ms, &mut self.rng);
        price
    }

    /// Sealed history plus the live candle for one timeframe, oldest first.
    pub fn candles(&self, timeframe: Timeframe) -> Vec<Candle> {
        self.aggregator.candles(timeframe)
    }

    pub fn current_price(&self) -> f64 {
        self.process.current_price()
    }

    pub fn initial_price(&self) -> f64 {
        self.process.initial_price()
    }

    pub fn is_shock_active(&self) -> bool {
        self.process.is_shock_active()
    }

    pub fn volatility(&self) -> f64 {
        self.process.volatility()
    }
}
