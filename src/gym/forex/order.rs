use serde::{Deserialize, Serialize};

use crate::{
    data::{
        domain::{Lots, Money, PipCost, Pips, Price, TickIndex},
        row::ActionRow,
    },
    gym::forex::{action::Decision, config::EnvConfig, types::TradeType},
};

/// The single open position of a symbol.
///
/// An order only exists while a position is held; a flat symbol has no `Order` at all.
/// Orders are opened from a [`Decision`] and never modified afterwards: the thresholds
/// fixed at open time stay in force until a close event drops the order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    trade_type: TradeType,
    open_price: Price,
    volume: Lots,
    stop_loss: Pips,
    take_profit: Pips,
    open_tick: TickIndex,
}

impl Order {
    /// Opens a position at the current bar.
    ///
    /// - **Long** buys at the ask: `close + spread`.
    /// - **Short** sells at the bid: `close`.
    ///
    /// Thresholds are `max × decision component`, unclamped. The volume is the
    /// equity fraction `equity × max_volume × leverage × decision.volume` expressed in lots
    /// and snapped onto the lot grid with [`Lots::from_raw`].
    pub fn open(
        trade_type: TradeType,
        row: &ActionRow,
        spread: Price,
        decision: &Decision,
        equity: Money,
        cfg: &EnvConfig,
        tick: TickIndex,
    ) -> Self {
        let open_price = match trade_type {
            TradeType::Long => row.close + spread,
            TradeType::Short => row.close,
        };
        let raw_volume =
            equity.0 * cfg.max_volume() * cfg.leverage() * decision.volume / cfg.lot_size();

        Self {
            trade_type,
            open_price,
            volume: Lots::from_raw(raw_volume),
            stop_loss: Pips(cfg.max_sl() * decision.stop_loss),
            take_profit: Pips(cfg.max_tp() * decision.take_profit),
            open_tick: tick,
        }
    }

    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    pub fn open_price(&self) -> Price {
        self.open_price
    }

    pub fn volume(&self) -> Lots {
        self.volume
    }

    pub fn stop_loss(&self) -> Pips {
        self.stop_loss
    }

    pub fn take_profit(&self) -> Pips {
        self.take_profit
    }

    pub fn open_tick(&self) -> TickIndex {
        self.open_tick
    }

    /// Capital reserved by this order: `volume × lot_size / leverage`.
    pub fn margin(&self, cfg: &EnvConfig) -> Money {
        Money(self.volume.units(cfg.lot_size()) / cfg.leverage())
    }

    /// Unrealized profit in pips against the bar's worst exit price.
    pub fn profit_pips(&self, row: &ActionRow, spread: Price, pip: PipCost) -> Pips {
        self.trade_type
            .profit_pips(self.open_price, row.low, row.high, spread, pip)
    }

    /// Converts a pip distance into account currency for this order's size.
    pub fn profit(&self, pips: Pips, pip: PipCost, cfg: &EnvConfig) -> Money {
        Money(pip.to_price(pips).0 * self.volume.units(cfg.lot_size()))
    }

    pub fn is_stop_loss_hit(&self, pips: Pips) -> bool {
        pips <= -self.stop_loss
    }

    pub fn is_take_profit_hit(&self, pips: Pips) -> bool {
        pips >= self.take_profit
    }
}
