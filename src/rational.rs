/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Best rational approximation with bounded numerator and denominator.

/// Finds `b / c` closest to `numerator / denominator` with `b <= max_numerator`
/// and `1 <= c <= max_denominator`.
///
/// Walks the continued fraction expansion and stops at the first convergent
/// that breaks a bound. At that point either the previous convergent or the
/// largest admissible semi-convergent is the answer, whichever lies closer.
pub fn best_approximation(
    numerator: u64,
    denominator: u64,
    max_numerator: u64,
    max_denominator: u64,
) -> (u64, u64) {
    if numerator == 0 || denominator == 0 || max_numerator == 0 || max_denominator == 0 {
        return (0, 1);
    }

    let (mut n, mut d) = (numerator, denominator);
    let (mut n0, mut n1) = (0u64, 1u64);
    let (mut d0, mut d1) = (1u64, 0u64);

    while d != 0 {
        let dp = d;
        let a = n / d;
        d = n % d;
        n = dp;

        let n2 = n0.saturating_add(a.saturating_mul(n1));
        let d2 = d0.saturating_add(a.saturating_mul(d1));

        if n2 > max_numerator || d2 > max_denominator {
            let mut t = u64::MAX;
            if d1 != 0 {
                t = (max_denominator - d0) / d1;
            }
            if n1 != 0 {
                t = t.min((max_numerator - n0) / n1);
            }

            // with no previous convergent the semi-convergent always wins
            if d1 == 0 || t.saturating_mul(2) > a || (2 * t == a && d0 * dp > d1 * d) {
                n1 = n0 + t * n1;
                d1 = d0 + t * d1;
            }
            break;
        }

        n0 = n1;
        n1 = n2;
        d0 = d1;
        d1 = d2;
    }

    (n1, d1)
}
