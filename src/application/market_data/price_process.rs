use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

/// Hard floor for the simulated price. The process is multiplicative, so the
/// floor keeps the series strictly positive even through the worst shock run.
pub const PRICE_FLOOR: f64 = 1_000.0;

/// A temporary volatility/drift spike. At most one is active at a time and it
/// self-terminates when `elapsed_ms` reaches `duration_ms`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ShockEvent {
    pub intensity: f64,
    pub duration_ms: f64,
    pub elapsed_ms: f64,
    pub direction: f64,
}

impl ShockEvent {
    /// Envelope over the shock's lifetime: zero at both ends, peaking at the
    /// midpoint, so intensity ramps in and fades out instead of stepping.
    fn envelope(&self) -> f64 {
        let progress = self.elapsed_ms / self.duration_ms;
        (progress * std::f64::consts::PI).sin()
    }
}

/// Geometric-Brownian-motion price generator with GARCH-style volatility
/// clustering, persistent micro-trends, momentum, order-flow pressure and
/// rare shock/jump events.
///
/// All randomness comes from the caller-supplied generator, so a fixed seed
/// reproduces the full path.
#[derive(Debug)]
pub struct PriceProcess {
    current_price: f64,
    initial_price: f64,
    volatility: f64,
    volatility_state: f64,
    drift: f64,
    micro_trend: f64,
    trend_strength: f64,
    momentum_bias: f64,
    last_price_change: f64,
    order_flow_imbalance: f64,
    shock: Option<ShockEvent>,
}

impl PriceProcess {
    pub fn new<R: Rng>(start_price: f64, rng: &mut R) -> Self {
        Self {
            current_price: start_price,
            initial_price: start_price,
            // Base volatility 0.015-0.045% per step, drift within ±0.002%
            volatility: 0.00015 + rng.random::<f64>() * 0.0003,
            volatility_state: 0.0,
            drift: (rng.random::<f64>() - 0.5) * 0.00004,
            micro_trend: 0.0,
            trend_strength: 0.0,
            momentum_bias: 0.0,
            last_price_change: 0.0,
            order_flow_imbalance: 0.0,
            shock: None,
        }
    }

    /// Advances the process by `dt` seconds and returns the new price.
    pub fn advance<R: Rng>(&mut self, dt: f64, rng: &mut R) -> f64 {
        if dt <= 0.0 {
            return self.current_price;
        }

        // Micro trends persist but occasionally re-seed, then decay toward zero
        if rng.random::<f64>() < 0.02 * dt {
            self.micro_trend = (rng.random::<f64>() - 0.5) * 0.0001;
            self.trend_strength = rng.random::<f64>();
        }
        // Decay factors clamp at zero so an oversized dt cannot flip signs
        self.micro_trend *= (1.0 - 0.1 * dt).max(0.0);
        self.trend_strength *= (1.0 - 0.05 * dt).max(0.0);

        // Momentum: EMA of the previous step's fractional change
        self.momentum_bias = self.momentum_bias * 0.95 + self.last_price_change * 0.05;

        // Order flow pressure: small symmetric random walk with decay
        self.order_flow_imbalance += (rng.random::<f64>() - 0.5) * 0.2;
        self.order_flow_imbalance *= 0.98;

        // Rare shock events (0.3% chance per second), mutually exclusive
        if self.shock.is_none() && rng.random::<f64>() < 0.003 * dt {
            let direction = if rng.random::<f64>() > 0.5 { 1.0 } else { -1.0 };
            self.shock = Some(ShockEvent {
                intensity: 1.5 + rng.random::<f64>() * 4.0, // 1.5-5.5x volatility
                duration_ms: 2_000.0 + rng.random::<f64>() * 8_000.0, // 2-10 seconds
                elapsed_ms: 0.0,
                direction,
            });
        }

        let mut vol_mult = 1.0;
        let mut shock_drift = 0.0;
        if let Some(shock) = &mut self.shock {
            shock.elapsed_ms += dt * 1_000.0;
            let envelope = shock.envelope();
            vol_mult = 1.0 + shock.intensity * envelope;
            shock_drift = shock.direction * 0.0001 * envelope;

            if shock.elapsed_ms >= shock.duration_ms {
                self.shock = None;
            }
        }

        // GARCH-like volatility clustering
        let vol_shock = (rng.random::<f64>() - 0.5) * 2.0;
        self.volatility_state = 0.92 * self.volatility_state + 0.08 * vol_shock;
        let current_vol = self.volatility * vol_mult * (1.0 + self.volatility_state.abs() * 0.6);

        // Weak pull back toward the initial price
        let price_ratio = self.current_price / self.initial_price;
        let mean_reversion = (1.0 - price_ratio) * 0.000005;

        let total_drift = self.drift
            + mean_reversion
            + self.micro_trend * self.trend_strength
            + shock_drift
            + self.order_flow_imbalance * 0.00001;

        // GBM step: dS = S * (mu*dt + sigma*dW)
        let normal = Normal::new(0.0, dt.sqrt()).expect("finite std dev");
        let dw = normal.sample(rng);
        let mut price_change = self.current_price * (total_drift * dt + current_vol * dw);

        price_change += self.momentum_bias * self.current_price * 0.3;

        // Jumps: directional during a shock, tiny and undirected otherwise
        let mut jump = 0.0;
        if let Some(shock) = &self.shock {
            if rng.random::<f64>() < 0.15 * dt {
                let jump_size = 0.0005 + rng.random::<f64>() * 0.002; // 0.05-0.25%
                jump = self.current_price * jump_size * shock.direction;
            }
        } else if rng.random::<f64>() < 0.05 * dt {
            jump = self.current_price * (rng.random::<f64>() - 0.5) * 0.0003;
        }

        let total_change = price_change + jump;
        self.last_price_change = total_change / self.current_price;
        self.current_price = PRICE_FLOOR.max(self.current_price + total_change);

        // Base volatility slowly reverts toward a freshly sampled target,
        // clamped to a fixed band
        let vol_target = 0.0002 + rng.random::<f64>() * 0.0002;
        self.volatility = (self.volatility * 0.995 + vol_target * 0.005).clamp(0.0001, 0.004);

        self.current_price
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn initial_price(&self) -> f64 {
        self.initial_price
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn is_shock_active(&self) -> bool {
        self.shock.is_some()
    }
}
