//! EMA crossover state machine with repeat suppression and optional
//! trend-filter / Stochastic RSI gates.

use crate::indicators::trend::detect_crossover;
use crate::models::indicators::IndicatorState;
use crate::models::signal::{CrossoverType, Signal, SignalAction, SignalState};
use crate::models::strategy::StrategyConfig;
use tracing::{debug, warn};

/// Per-asset detector. Counters and state persist across ticks.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    config: StrategyConfig,
    state: SignalState,
    buy_count: u64,
    sell_count: u64,
    /// Crossover direction still waiting for its gates to pass.
    pending: Option<SignalAction>,
}

struct GateOutcome {
    ma_filter_passed: Option<bool>,
    stoch_confirmed: Option<bool>,
}

impl GateOutcome {
    fn passed(&self) -> bool {
        self.ma_filter_passed.unwrap_or(true) && self.stoch_confirmed.unwrap_or(true)
    }
}

impl SignalDetector {
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            state: SignalState::Flat,
            buy_count: 0,
            sell_count: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn pending(&self) -> Option<SignalAction> {
        self.pending
    }

    pub fn counts(&self) -> (u64, u64) {
        (self.buy_count, self.sell_count)
    }

    pub fn evaluate(&mut self, indicators: &IndicatorState) -> Signal {
        let fast = indicators.fast_ema;
        let slow = indicators.slow_ema;
        let crossover = detect_crossover(&fast, &slow);

        if fast.current > slow.current {
            self.buy_count += 1;
            self.sell_count = 0;
        } else if fast.current < slow.current {
            self.sell_count += 1;
            self.buy_count = 0;
        }

        match crossover {
            CrossoverType::Bullish => self.pending = Some(SignalAction::Buy),
            CrossoverType::Bearish => self.pending = Some(SignalAction::Sell),
            CrossoverType::None => {
                let regime_flipped = match self.pending {
                    Some(SignalAction::Buy) => fast.current <= slow.current,
                    Some(SignalAction::Sell) => fast.current >= slow.current,
                    _ => false,
                };
                if regime_flipped {
                    self.pending = None;
                }
            }
        }

        let candidate = match (self.pending, self.state) {
            (Some(SignalAction::Buy), state) if state != SignalState::Long => SignalAction::Buy,
            (Some(SignalAction::Sell), state) if state != SignalState::Short => SignalAction::Sell,
            _ => {
                // Already acted on this leg of the trend.
                self.pending = None;
                SignalAction::Hold
            }
        };

        if candidate == SignalAction::Hold {
            return self.build_signal(
                indicators,
                SignalAction::Hold,
                crossover,
                GateOutcome {
                    ma_filter_passed: None,
                    stoch_confirmed: None,
                },
                self.trend_rationale(indicators),
            );
        }

        let gates = self.apply_gates(candidate, indicators);
        if !gates.passed() {
            // An opposite crossover re-arms the detector even when filtered.
            if self.state.is_opposite_of(candidate) {
                self.state = SignalState::Flat;
            }
            let rationale = self.filtered_rationale(candidate, &gates);
            debug!(
                asset = %indicators.asset,
                candidate = ?candidate,
                ma_filter_passed = ?gates.ma_filter_passed,
                stoch_confirmed = ?gates.stoch_confirmed,
                "SignalDetector: {} candidate downgraded to hold",
                candidate
            );
            return self.build_signal(indicators, SignalAction::Hold, crossover, gates, rationale);
        }

        self.state = match candidate {
            SignalAction::Buy => SignalState::Long,
            _ => SignalState::Short,
        };
        self.pending = None;
        let rationale = self.emitted_rationale(candidate, indicators, &gates);
        self.build_signal(indicators, candidate, crossover, gates, rationale)
    }

    fn apply_gates(&self, candidate: SignalAction, indicators: &IndicatorState) -> GateOutcome {
        let is_buy = candidate == SignalAction::Buy;

        let ma_filter_passed = if self.config.ma_filter_type.is_enabled() {
            match indicators.ma_filter {
                Some(filter) if is_buy => Some(indicators.close > filter.value),
                Some(filter) => Some(indicators.close < filter.value),
                None => {
                    warn!(
                        asset = %indicators.asset,
                        "SignalDetector: MA filter value unavailable, allowing signal"
                    );
                    Some(true)
                }
            }
        } else {
            None
        };

        let stoch_confirmed = if self.config.use_stoch_confirmation {
            let middle = self.config.stoch_middle_band;
            match indicators.stoch_rsi {
                Some(stoch) if is_buy => {
                    Some(stoch.crossed_above() && (stoch.k < middle || stoch.d < middle))
                }
                Some(stoch) => {
                    Some(stoch.crossed_below() && (stoch.k > middle || stoch.d > middle))
                }
                None => Some(true),
            }
        } else {
            None
        };

        GateOutcome {
            ma_filter_passed,
            stoch_confirmed,
        }
    }

    fn build_signal(
        &self,
        indicators: &IndicatorState,
        action: SignalAction,
        crossover: CrossoverType,
        gates: GateOutcome,
        rationale: String,
    ) -> Signal {
        Signal {
            asset: indicators.asset.clone(),
            action,
            crossover,
            from_pending: action.is_directional() && crossover == CrossoverType::None,
            buy_count: self.buy_count,
            sell_count: self.sell_count,
            ma_filter_passed: gates.ma_filter_passed,
            stoch_confirmed: gates.stoch_confirmed,
            state: self.state,
            price: indicators.close,
            timestamp: indicators.timestamp,
            rationale,
            exit_plan: None,
        }
    }

    fn filter_label(&self) -> String {
        format!(
            "{}({})",
            self.config.ma_filter_type, self.config.ma_filter_period
        )
    }

    fn emitted_rationale(
        &self,
        action: SignalAction,
        indicators: &IndicatorState,
        gates: &GateOutcome,
    ) -> String {
        let (label, verb, relation) = match action {
            SignalAction::Buy => ("BUY", "crossed above", "above"),
            _ => ("SELL", "crossed below", "below"),
        };
        let mut rationale = format!(
            "{}: Fast EMA({})={:.2} {} Slow EMA({})={:.2}.",
            label,
            self.config.fast_period,
            indicators.fast_ema.current,
            verb,
            self.config.slow_period,
            indicators.slow_ema.current
        );
        if gates.ma_filter_passed.is_some() {
            rationale.push_str(&format!(" Price {} {}.", relation, self.filter_label()));
        }
        if gates.stoch_confirmed.is_some() {
            rationale.push_str(" StochRSI K/D crossover confirmed.");
        }
        rationale
    }

    fn filtered_rationale(&self, candidate: SignalAction, gates: &GateOutcome) -> String {
        let (label, relation) = match candidate {
            SignalAction::Buy => ("BUY", "below"),
            _ => ("SELL", "above"),
        };
        let mut reasons = Vec::new();
        if gates.ma_filter_passed == Some(false) {
            reasons.push(format!("price {} {}", relation, self.filter_label()));
        }
        if gates.stoch_confirmed == Some(false) {
            reasons.push("StochRSI not confirmed".to_string());
        }
        format!("{} signal filtered out: {}", label, reasons.join(", "))
    }

    fn trend_rationale(&self, indicators: &IndicatorState) -> String {
        let fast = indicators.fast_ema.current;
        let slow = indicators.slow_ema.current;
        if fast > slow {
            "HOLD: Bullish trend (Fast EMA > Slow EMA), waiting for signal".to_string()
        } else if fast < slow {
            "HOLD: Bearish trend (Fast EMA < Slow EMA), waiting for signal".to_string()
        } else {
            "HOLD: EMAs aligned, no clear trend".to_string()
        }
    }
}
