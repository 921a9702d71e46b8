use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::error::ContractError;

// 100%
pub const MAX_DISCOUNT_BPS: u16 = 10_000;

// the curve must decrease at least this many times over the auction
pub const MIN_PRICE_STEPS: u64 = 4;

/// Dutch auction decay schedule.
#[cw_serde]
pub struct PriceCurve {
    pub start_price: Uint128,
    pub floor_price: Uint128,
    // seconds
    pub duration: u64,
    // seconds between two price drops
    pub drop_interval: u64,
    // derived: (start_price - floor_price) / (duration / drop_interval)
    pub price_drop: Uint128,
}

impl PriceCurve {
    pub fn new(
        start_price: Uint128,
        floor_price: Uint128,
        duration: u64,
        drop_interval: u64,
    ) -> Result<Self, ContractError> {
        if start_price <= floor_price {
            return Err(ContractError::InvalidPriceCurve {
                reason: "start price must be greater than floor price".to_string(),
            });
        }
        if drop_interval == 0 {
            return Err(ContractError::InvalidPriceCurve {
                reason: "drop interval must be non-zero".to_string(),
            });
        }
        if drop_interval > duration / MIN_PRICE_STEPS {
            return Err(ContractError::InvalidPriceCurve {
                reason: format!(
                    "drop interval {} is longer than a {}th of the duration {}",
                    drop_interval, MIN_PRICE_STEPS, duration
                ),
            });
        }

        let steps = duration / drop_interval;
        let price_drop = (start_price - floor_price).multiply_ratio(1u128, u128::from(steps));

        Ok(Self {
            start_price,
            floor_price,
            duration,
            drop_interval,
            price_drop,
        })
    }

    /// Auction price at `now` for an auction that started at `start` (both in seconds).
    pub fn price_at(&self, start: u64, now: u64) -> Uint128 {
        if now < start {
            return self.start_price;
        }

        let elapsed = now - start;
        if elapsed >= self.duration {
            return self.floor_price;
        }

        let steps = Uint128::from(elapsed / self.drop_interval);
        // steps * price_drop never exceeds start_price - floor_price
        self.start_price - self.price_drop * steps
    }
}

/// Prices of the sale: the optional auction curve and the discounted follow-up prices.
#[cw_serde]
pub struct Pricing {
    pub curve: Option<PriceCurve>,
    // the last price paid in the auction, or the flat price when there is no auction
    pub last_price: Uint128,
    pub allowlist_discount_bps: u16,
    pub public_discount_bps: u16,
}

impl Pricing {
    pub fn new(
        curve: Option<PriceCurve>,
        flat_price: Option<Uint128>,
        allowlist_discount_bps: u16,
        public_discount_bps: u16,
    ) -> Result<Self, ContractError> {
        for bps in [allowlist_discount_bps, public_discount_bps] {
            if bps > MAX_DISCOUNT_BPS {
                return Err(ContractError::InvalidDiscount {
                    discount_bps: bps,
                    max_bps: MAX_DISCOUNT_BPS,
                });
            }
        }

        let last_price = match (&curve, flat_price) {
            (Some(curve), None) => curve.start_price,
            (None, Some(flat_price)) => flat_price,
            (Some(_), Some(_)) => {
                return Err(ContractError::InvalidPriceCurve {
                    reason: "flat price cannot be combined with an auction".to_string(),
                })
            }
            (None, None) => {
                return Err(ContractError::InvalidPriceCurve {
                    reason: "either an auction curve or a flat price is required".to_string(),
                })
            }
        };

        Ok(Self {
            curve,
            last_price,
            allowlist_discount_bps,
            public_discount_bps,
        })
    }

    /// Remembers the price of the latest auction purchase; discounted prices follow it.
    pub fn record_purchase_price(&mut self, price: Uint128) {
        self.last_price = price;
    }

    pub fn allowlist_price(&self) -> Uint128 {
        discounted(self.last_price, self.allowlist_discount_bps)
    }

    pub fn public_price(&self) -> Uint128 {
        discounted(self.last_price, self.public_discount_bps)
    }
}

/// `price - price * bps / 10000`, with the discount rounded down.
pub fn discounted(price: Uint128, discount_bps: u16) -> Uint128 {
    price - price.multiply_ratio(discount_bps, MAX_DISCOUNT_BPS)
}
