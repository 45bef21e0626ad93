use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    data::{
        domain::{Money, PipCost, Pips, Price, SymbolId, TickIndex},
        row::ActionRow,
    },
    gym::forex::{
        account::Account,
        action::Decision,
        config::EnvConfig,
        order::Order,
        reward::RewardShaper,
        types::{CloseCause, Direction, TradeType},
    },
};

/// Result of one symbol's tick transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolTransition {
    /// Reward normalized by the initial capital.
    pub reward: f64,
    /// The account was liquidated by a margin call during this tick.
    pub margin_call: bool,
}

/// Account and order state machine of one symbol.
///
/// # Tick transition order
///
/// Within a tick the following rules run in this exact order:
///
/// 1. spread of the bar
/// 2. unrealized profit of the held order, then `equity = balance + profit`
/// 3. margin call (`equity < margin`): liquidates and skips steps 4 to 6
/// 4. stop-loss, then take-profit, both checked against the order held at tick start
/// 5. open on a flat symbol following the decision's direction
/// 6. close on an opposing direction once the minimum holding time has elapsed
/// 7. reward shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulator {
    symbol: SymbolId,
    pip_cost: PipCost,
    account: Account,
    order: Option<Order>,
    unrealized: Money,
}

impl Simulator {
    pub fn new(symbol: SymbolId, pip_cost: PipCost, capital: f64) -> Self {
        Self {
            symbol,
            pip_cost,
            account: Account::new(capital),
            order: None,
            unrealized: Money::ZERO,
        }
    }

    pub fn reset(&mut self) {
        self.account.reset();
        self.order = None;
        self.unrealized = Money::ZERO;
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn pip_cost(&self) -> PipCost {
        self.pip_cost
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn direction(&self) -> Direction {
        self.order
            .map_or(Direction::Flat, |order| order.trade_type().direction())
    }

    /// Profit of the open order marked at the last processed bar.
    pub fn unrealized(&self) -> Money {
        self.unrealized
    }

    /// Runs one tick transition.
    ///
    /// `is_final` marks the last tick of the episode, on which terminal reward shaping
    /// applies.
    pub fn step(
        &mut self,
        row: &ActionRow,
        decision: &Decision,
        tick: TickIndex,
        is_final: bool,
        cfg: &EnvConfig,
        shaper: &RewardShaper,
    ) -> SymbolTransition {
        let pip = self.pip_cost;
        let spread = cfg.spread().spread(row, pip);

        let mut pips = Pips::default();
        self.unrealized = Money::ZERO;
        if let Some(order) = &self.order {
            pips = order.profit_pips(row, spread, pip);
            self.unrealized = order.profit(pips, pip, cfg);
        }
        self.account.mark_to_market(self.unrealized);

        let margin_call = self.account.is_margin_call();
        if margin_call {
            self.liquidate(tick);
        } else {
            self.apply_exit_rules(pips, tick);
            self.apply_decision(row, spread, decision, tick, cfg);
        }

        let reward = shaper.shape(&mut self.account, is_final);
        self.account.end_step(reward);

        SymbolTransition {
            reward,
            margin_call,
        }
    }

    fn liquidate(&mut self, tick: TickIndex) {
        let direction = self.direction();
        self.account.liquidate();
        self.order = None;
        self.unrealized = Money::ZERO;
        info!(
            symbol = %self.symbol,
            %tick,
            %direction,
            "Margin Call (Account Liquidated)"
        );
    }

    fn apply_exit_rules(&mut self, mut pips: Pips, tick: TickIndex) {
        let Some(held) = self.order else {
            return;
        };

        if held.is_stop_loss_hit(pips) {
            self.close(CloseCause::StopLoss, pips, tick);
            pips = Pips::default();
        }
        if held.is_take_profit_hit(pips) {
            self.close(CloseCause::TakeProfit, pips, tick);
        }
    }

    fn apply_decision(
        &mut self,
        row: &ActionRow,
        spread: Price,
        decision: &Decision,
        tick: TickIndex,
        cfg: &EnvConfig,
    ) {
        let signal = decision.signal();

        if self.order.is_none() {
            let trade_type = match signal {
                Direction::Long => Some(TradeType::Long),
                Direction::Short => Some(TradeType::Short),
                Direction::Flat => None,
            };
            if let Some(trade_type) = trade_type {
                self.open(trade_type, row, spread, decision, tick, cfg);
            }
        }

        let Some(order) = self.order else {
            return;
        };
        if tick.since(order.open_tick()) <= cfg.min_order_time() {
            return;
        }

        let opposing = match order.trade_type() {
            TradeType::Long => signal == Direction::Short,
            TradeType::Short => signal == Direction::Long,
        };
        if opposing {
            let pips = order.profit_pips(row, spread, self.pip_cost);
            self.close(CloseCause::NormalClose, pips, tick);
        } else if signal.is_flat() {
            debug!(
                symbol = %self.symbol,
                %tick,
                direction = %order.trade_type(),
                unrealized = self.unrealized.0,
                "Holding Position"
            );
        }
    }

    fn open(
        &mut self,
        trade_type: TradeType,
        row: &ActionRow,
        spread: Price,
        decision: &Decision,
        tick: TickIndex,
        cfg: &EnvConfig,
    ) {
        let order = Order::open(
            trade_type,
            row,
            spread,
            decision,
            self.account.equity(),
            cfg,
            tick,
        );
        self.account.reserve_margin(order.margin(cfg));
        self.order = Some(order);

        info!(
            symbol = %self.symbol,
            %tick,
            direction = %trade_type,
            open_price = order.open_price().0,
            volume = order.volume().0,
            take_profit = order.take_profit().0,
            stop_loss = order.stop_loss().0,
            balance = self.account.balance().0,
            "Order Opened"
        );
    }

    fn close(&mut self, cause: CloseCause, pips: Pips, tick: TickIndex) {
        self.account.settle(cause);
        self.order = None;
        self.unrealized = Money::ZERO;

        info!(
            symbol = %self.symbol,
            %tick,
            %cause,
            profit_pips = pips.0,
            balance = self.account.balance().0,
            num_closes = self.account.num_closes(),
            "Order Closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::data::domain::Lots;

    use super::*;

    const CAPITAL: f64 = 10_000.0;
    const NUM_TICKS: usize = 100;

    fn cfg() -> EnvConfig {
        EnvConfig::new(CAPITAL)
            .with_pip_cost(vec![PipCost(0.0001)])
            .with_stop_loss_range(0.0, 100.0)
            .with_take_profit_range(0.0, 100.0)
            .with_max_volume(0.1)
            .with_leverage(100.0)
    }

    fn shaper() -> RewardShaper {
        RewardShaper::new(CAPITAL, NUM_TICKS, 4)
    }

    fn simulator() -> Simulator {
        Simulator::new(SymbolId(0), PipCost(0.0001), CAPITAL)
    }

    /// Wednesday noon bar: liquid, spread = 20 pips of 0.0001.
    fn bar(high: f64, low: f64, close: f64) -> [f64; 10] {
        [high, low, close, close, 10.0, 6.0, 12.0, 3.0, 12.0, 0.0]
    }

    fn step(
        sim: &mut Simulator,
        fields: &[f64],
        decision: Decision,
        tick: usize,
    ) -> SymbolTransition {
        let row = ActionRow::decode(fields).expect("row");
        sim.step(&row, &decision, TickIndex(tick), false, &cfg(), &shaper())
    }

    #[test]
    fn test_long_decision_on_flat_opens_at_ask() {
        let mut sim = simulator();
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::long(0.5, 0.5, 1.0), 5);

        let order = sim.order().expect("order opened");
        assert_eq!(sim.direction(), Direction::Long);
        assert!((order.open_price().0 - 1.1020).abs() < 1e-12, "close + 20 pips");
        assert_eq!(order.take_profit(), Pips(50.0));
        assert_eq!(order.stop_loss(), Pips(50.0));
        assert_eq!(order.volume(), Lots(1.0));
        assert_eq!(sim.account().margin(), Money(1_000.0));
        assert_eq!(sim.account().num_closes(), 0);
    }

    #[test]
    fn test_stop_loss_closes_long() {
        let mut sim = simulator();
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::long(0.5, 0.5, 1.0), 5);

        // open 1.1020, low 1.0960 -> -60 pips <= -50
        step(&mut sim, &bar(1.1000, 1.0960, 1.0970), Decision::flat(), 6);

        assert!(sim.order().is_none());
        assert_eq!(sim.account().close_cause(), CloseCause::StopLoss);
        assert_eq!(sim.account().num_closes(), 1);
        assert_eq!(sim.account().margin(), Money::ZERO);
        assert!((sim.account().balance().0 - (CAPITAL - 600.0)).abs() < 1e-6);
        assert_eq!(sim.account().balance(), sim.account().equity());
    }

    #[test]
    fn test_take_profit_closes_short() {
        let mut sim = simulator();
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::short(0.5, 0.5, 1.0), 5);
        assert_eq!(sim.direction(), Direction::Short);

        // open 1.1000, high 1.0920 + 20 pip spread -> +60 pips >= 50
        step(&mut sim, &bar(1.0920, 1.0900, 1.0910), Decision::flat(), 6);

        assert_eq!(sim.account().close_cause(), CloseCause::TakeProfit);
        assert_eq!(sim.account().num_closes(), 1);
        assert!(sim.account().balance().0 > CAPITAL);
    }

    #[test]
    fn test_margin_call_takes_precedence_over_take_profit() {
        let mut sim = simulator();
        // take-profit at -1000 pips, stop-loss at 1000 pips
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::long(-1.0, 1.0, 1.0), 5);

        // open 1.1020, low 1.0070 -> -950 pips: take-profit is hit, stop-loss is not,
        // and equity 500 falls below margin 1_000
        let transition = step(&mut sim, &bar(1.0100, 1.0070, 1.0080), Decision::flat(), 6);

        assert!(transition.margin_call);
        assert_eq!(transition.reward, -5.0);
        assert_eq!(sim.account().close_cause(), CloseCause::MarginCall);
        assert_eq!(sim.account().num_closes(), 0);
        assert_eq!(sim.account().balance(), Money::ZERO);
        assert_eq!(sim.account().equity(), Money::ZERO);
        assert_eq!(sim.account().margin(), Money::ZERO);
        assert!(sim.order().is_none());
    }

    #[test]
    fn test_inconsistent_thresholds_fire_both_exits() {
        let mut sim = simulator();
        // stop-loss -10 pips (hit by any profit <= 10), take-profit -50 pips
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::long(-0.5, -0.1, 1.0), 5);

        step(&mut sim, &bar(1.1030, 1.1025, 1.1028), Decision::flat(), 6);

        assert_eq!(sim.account().num_closes(), 2);
        assert_eq!(sim.account().previous_close_cause(), CloseCause::StopLoss);
        assert_eq!(sim.account().close_cause(), CloseCause::TakeProfit);
    }

    #[test]
    fn test_exit_rules_are_skipped_when_flat() {
        let mut sim = simulator();
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::flat(), 5);
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::flat(), 6);
        assert_eq!(sim.account().num_closes(), 0);
        assert_eq!(sim.account().close_cause(), CloseCause::None);
        assert_eq!(sim.unrealized(), Money::ZERO);
        assert_eq!(sim.account().equity(), sim.account().balance());
    }

    #[test]
    fn test_opposing_decision_respects_min_order_time() {
        let cfg = cfg().with_min_order_time(2);
        let shaper = shaper();
        let mut sim = simulator();
        let flat_bar = bar(1.1030, 1.1020, 1.1025);

        let run = |fields: &[f64], decision: Decision, tick: usize, sim: &mut Simulator| {
            let row = ActionRow::decode(fields).expect("row");
            sim.step(&row, &decision, TickIndex(tick), false, &cfg, &shaper)
        };

        run(&bar(1.1010, 1.0990, 1.1000), Decision::long(1.0, 1.0, 1.0), 10, &mut sim);
        run(&flat_bar, Decision::short(1.0, 1.0, 1.0), 12, &mut sim);
        assert_eq!(sim.direction(), Direction::Long, "held for only 2 ticks");

        run(&flat_bar, Decision::short(1.0, 1.0, 1.0), 13, &mut sim);
        assert_eq!(sim.direction(), Direction::Flat);
        assert_eq!(sim.account().close_cause(), CloseCause::NormalClose);
        assert_eq!(sim.account().num_closes(), 1);
    }

    #[test]
    fn test_equity_tracks_unrealized_profit() {
        let mut sim = simulator();
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::long(1.0, 1.0, 0.5), 5);
        step(&mut sim, &bar(1.1040, 1.1030, 1.1035), Decision::flat(), 6);

        let account = sim.account();
        assert_eq!(sim.direction(), Direction::Long);
        assert!(sim.unrealized().0 > 0.0);
        assert_eq!(account.equity(), account.balance() + sim.unrealized());
    }

    #[test]
    fn test_reset_clears_order_and_account() {
        let mut sim = simulator();
        step(&mut sim, &bar(1.1010, 1.0990, 1.1000), Decision::short(0.5, 0.5, 1.0), 5);
        sim.reset();
        assert!(sim.order().is_none());
        assert_eq!(sim.account().balance(), Money(CAPITAL));
        assert_eq!(sim.account().equity(), Money(CAPITAL));
        assert_eq!(sim.account().num_closes(), 0);
        assert_eq!(sim.direction(), Direction::Flat);
    }
}
