//! Wei → ether formatting.

use alloy_primitives::U256;

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;
/// Wei in 0.0001 ether.
const WEI_PER_FEE_UNIT: u64 = 100_000_000_000_000;

/// Exact ether value with trailing fractional zeros trimmed (`"1.5"`, `"0"`).
pub fn format_ether(wei: U256) -> String {
    let unit = U256::from(WEI_PER_ETHER);
    let whole = wei / unit;
    let frac = wei % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let digits = format!("{:0>18}", frac.to_string());
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// `gas_price * gas_used` in ether, rounded half-up to 4 decimal places.
pub fn fee_ether(gas_price: U256, gas_used: u64) -> String {
    let total = gas_price.saturating_mul(U256::from(gas_used));
    let unit = U256::from(WEI_PER_FEE_UNIT);
    let scaled = total.saturating_add(unit / U256::from(2u64)) / unit;
    let whole = scaled / U256::from(10_000u64);
    let frac = u64::try_from(scaled % U256::from(10_000u64)).unwrap_or(0);
    format!("{whole}.{frac:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_formatting() {
        assert_eq!(format_ether(U256::ZERO), "0");
        assert_eq!(format_ether(U256::from(WEI_PER_ETHER)), "1");
        assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u64)), "1.5");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn fee_rounding() {
        // 21000 gas at 1 gwei = 0.000021 ether
        assert_eq!(fee_ether(U256::from(1_000_000_000u64), 21_000), "0.0000");
        // 21000 gas at 20 gwei = 0.00042 ether
        assert_eq!(fee_ether(U256::from(20_000_000_000u64), 21_000), "0.0004");
        // 0.00005 ether rounds up
        assert_eq!(fee_ether(U256::from(50_000_000_000_000u64), 1), "0.0001");
        assert_eq!(fee_ether(U256::from(WEI_PER_ETHER), 3), "3.0000");
    }
}
