// Copyright 2025 The Suzaku CLI Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dynamic fee estimation for P-Chain transactions.
//!
//! Estimates over-approximate the network's complexity metering and add a
//! 25% margin, so a fee computed here never underpays between the fee state
//! query and inclusion.

use std::ops::Add;

/// Gas charged per unit of each complexity dimension.
pub const BANDWIDTH_WEIGHT: u64 = 1;
pub const DB_READ_WEIGHT: u64 = 1_000;
pub const DB_WRITE_WEIGHT: u64 = 1_000;
pub const COMPUTE_WEIGHT: u64 = 4;

/// Margin applied on top of the estimated fee, as a fraction.
const MARGIN_NUMERATOR: u128 = 5;
const MARGIN_DENOMINATOR: u128 = 4;

/// Resource usage of a transaction along the metered dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Complexity {
    pub bandwidth: u64,
    pub db_read: u64,
    pub db_write: u64,
    pub compute: u64,
}

impl Complexity {
    pub const fn new(bandwidth: u64, db_read: u64, db_write: u64, compute: u64) -> Self {
        Self { bandwidth, db_read, db_write, compute }
    }

    /// Complexity of consuming one UTXO with a single signature.
    pub const INPUT: Complexity = Complexity::new(0, 1, 1, 200);

    /// Complexity of producing one UTXO.
    pub const OUTPUT: Complexity = Complexity::new(0, 0, 1, 0);

    pub fn gas(&self) -> u64 {
        self.bandwidth
            .saturating_mul(BANDWIDTH_WEIGHT)
            .saturating_add(self.db_read.saturating_mul(DB_READ_WEIGHT))
            .saturating_add(self.db_write.saturating_mul(DB_WRITE_WEIGHT))
            .saturating_add(self.compute.saturating_mul(COMPUTE_WEIGHT))
    }
}

impl Add for Complexity {
    type Output = Complexity;

    fn add(self, rhs: Self) -> Self::Output {
        Complexity {
            bandwidth: self.bandwidth.saturating_add(rhs.bandwidth),
            db_read: self.db_read.saturating_add(rhs.db_read),
            db_write: self.db_write.saturating_add(rhs.db_write),
            compute: self.compute.saturating_add(rhs.compute),
        }
    }
}

/// Fixed complexity of each L1 validator transaction kind, excluding inputs and outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxKind {
    RegisterL1Validator,
    SetL1ValidatorWeight,
    IncreaseL1ValidatorBalance,
    DisableL1Validator,
}

impl TxKind {
    pub fn intrinsic(&self) -> Complexity {
        match self {
            // Includes BLS proof of possession and warp signature verification.
            TxKind::RegisterL1Validator => Complexity::new(0, 5, 6, 3_050),
            TxKind::SetL1ValidatorWeight => Complexity::new(0, 3, 5, 2_000),
            TxKind::IncreaseL1ValidatorBalance => Complexity::new(0, 2, 5, 0),
            TxKind::DisableL1Validator => Complexity::new(0, 2, 4, 200),
        }
    }
}

/// Complexity of a transaction of `kind` with the given shape.
pub fn tx_complexity(kind: TxKind, signed_size: usize, inputs: usize, outputs: usize) -> Complexity {
    let mut total = kind.intrinsic();
    total.bandwidth = total.bandwidth.saturating_add(signed_size as u64);
    for _ in 0..inputs {
        total = total + Complexity::INPUT;
    }
    for _ in 0..outputs {
        total = total + Complexity::OUTPUT;
    }
    total
}

/// Fee in nAVAX for `complexity` at `gas_price`, including the safety margin.
pub fn fee(complexity: Complexity, gas_price: u64) -> u64 {
    let raw = complexity.gas() as u128 * gas_price as u128;
    let with_margin = raw.saturating_mul(MARGIN_NUMERATOR) / MARGIN_DENOMINATOR;
    u64::try_from(with_margin).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_weights_dimensions() {
        let complexity = Complexity::new(300, 2, 3, 100);
        assert_eq!(complexity.gas(), 300 + 2_000 + 3_000 + 400);
    }

    #[test]
    fn inputs_and_outputs_accumulate() {
        let complexity = tx_complexity(TxKind::IncreaseL1ValidatorBalance, 250, 2, 1);
        assert_eq!(complexity, Complexity::new(250, 4, 8, 400));
    }

    #[test]
    fn fee_adds_margin() {
        let complexity = Complexity::new(1_000, 0, 0, 0);
        assert_eq!(fee(complexity, 4), 5_000);
        assert_eq!(fee(complexity, 0), 0);
    }

    #[test]
    fn fee_saturates() {
        let complexity = Complexity::new(u64::MAX, u64::MAX, 0, 0);
        assert_eq!(fee(complexity, u64::MAX), u64::MAX);
    }

    #[test]
    fn registration_costs_more_than_top_up() {
        let register = tx_complexity(TxKind::RegisterL1Validator, 500, 1, 1);
        let top_up = tx_complexity(TxKind::IncreaseL1ValidatorBalance, 500, 1, 1);
        assert!(register.gas() > top_up.gas());
    }
}
