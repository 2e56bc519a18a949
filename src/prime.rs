//! Prime table sizing.

use crate::error::TableError;

/// Trial-division primality test.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Smallest prime `>= capacity * growth_factor`.
pub fn next_table_size(capacity: usize, growth_factor: usize) -> Result<usize, TableError> {
    let overflow = || TableError::CapacityOverflow {
        capacity,
        growth_factor,
    };
    let mut candidate = capacity.checked_mul(growth_factor).ok_or_else(overflow)?;
    while !is_prime(candidate) {
        candidate = candidate.checked_add(1).ok_or_else(overflow)?;
    }
    Ok(candidate)
}
