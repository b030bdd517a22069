//! Pricing helpers
//!
//! Money is handled in integer minor units (COP has none, so values are the
//! plain peso amount).

use serde::{Deserialize, Serialize};

/// Discount percentage between an original and a current price.
///
/// Returns 0 when there is no original price advantage, otherwise the
/// percentage rounded to the nearest integer.
pub fn calculate_discount(precio_original: i64, precio_actual: i64) -> i64 {
    if precio_original <= 0 || precio_original <= precio_actual {
        return 0;
    }
    let ratio = (precio_original - precio_actual) as f64 / precio_original as f64;
    (ratio * 100.0).round() as i64
}

/// Flat shipping fee, waived above the free-shipping threshold.
pub fn shipping_cost(subtotal: i64, costo_envio: i64, envio_gratis_desde: i64) -> i64 {
    if subtotal > envio_gratis_desde {
        0
    } else {
        costo_envio
    }
}

/// Coarse inventory classification relative to a product's minimum stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Agotado,
    Critico,
    Bajo,
    Disponible,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Agotado => "agotado",
            StockStatus::Critico => "critico",
            StockStatus::Bajo => "bajo",
            StockStatus::Disponible => "disponible",
        }
    }
}

/// Classify a stock level against its minimum threshold.
pub fn stock_status(stock: i64, stock_minimo: i64) -> StockStatus {
    let minimo = stock_minimo.max(1) as f64;
    if stock <= 0 {
        StockStatus::Agotado
    } else if (stock as f64) < minimo * 0.2 {
        StockStatus::Critico
    } else if (stock as f64) < minimo * 0.5 {
        StockStatus::Bajo
    } else {
        StockStatus::Disponible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_basic() {
        assert_eq!(calculate_discount(100, 75), 25);
        assert_eq!(calculate_discount(39990, 25990), 35);
    }

    #[test]
    fn test_discount_no_original_advantage() {
        assert_eq!(calculate_discount(100, 100), 0);
        assert_eq!(calculate_discount(75, 100), 0);
        assert_eq!(calculate_discount(0, 100), 0);
    }

    #[test]
    fn test_discount_rounds_to_nearest() {
        // 1/3 -> 33.33% -> 33
        assert_eq!(calculate_discount(30000, 20000), 33);
        // 2/3 -> 66.67% -> 67
        assert_eq!(calculate_discount(30000, 10000), 67);
    }

    #[test]
    fn test_shipping_flat_fee_below_threshold() {
        assert_eq!(shipping_cost(49999, 10000, 50000), 10000);
        // Threshold is exclusive: exactly at the limit still pays shipping
        assert_eq!(shipping_cost(50000, 10000, 50000), 10000);
    }

    #[test]
    fn test_shipping_waived_above_threshold() {
        assert_eq!(shipping_cost(50001, 10000, 50000), 0);
        assert_eq!(shipping_cost(120000, 10000, 50000), 0);
    }

    #[test]
    fn test_stock_status_buckets() {
        assert_eq!(stock_status(0, 10), StockStatus::Agotado);
        assert_eq!(stock_status(1, 10), StockStatus::Critico);
        assert_eq!(stock_status(3, 10), StockStatus::Bajo);
        assert_eq!(stock_status(5, 10), StockStatus::Disponible);
        assert_eq!(stock_status(42, 10), StockStatus::Disponible);
    }
}
