// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign},
};

use num_traits::{One, ToPrimitive, Zero};
use rug::Rational;

use crate::numeric::scalar::{Scalar, Sign};

/// GMP rational. The exact number type behind every Nef computation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CgarRational(pub Rational);

impl Scalar for CgarRational {
    fn from_f64(value: f64) -> Option<Self> {
        Rational::from_f64(value).map(CgarRational)
    }

    fn from_num_den(num: i64, den: i64) -> Self {
        CgarRational(Rational::from((num, den)))
    }

    fn sign(&self) -> Sign {
        match self.0.cmp0() {
            Ordering::Less => Sign::Negative,
            Ordering::Equal => Sign::Zero,
            Ordering::Greater => Sign::Positive,
        }
    }

    fn denominator(&self) -> Self {
        CgarRational(Rational::from(self.0.denom().clone()))
    }
}

impl fmt::Display for CgarRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for CgarRational {
    fn from(value: i32) -> Self {
        CgarRational(Rational::from(value))
    }
}

impl From<Rational> for CgarRational {
    fn from(value: Rational) -> Self {
        CgarRational(value)
    }
}

impl<'a, 'b> Add<&'b CgarRational> for &'a CgarRational {
    type Output = CgarRational;

    fn add(self, rhs: &'b CgarRational) -> CgarRational {
        let mut result = self.0.clone();
        result += &rhs.0;
        CgarRational(result)
    }
}

impl Add for CgarRational {
    type Output = CgarRational;

    fn add(mut self, rhs: CgarRational) -> CgarRational {
        self.0 += rhs.0;
        self
    }
}

impl<'a, 'b> Sub<&'b CgarRational> for &'a CgarRational {
    type Output = CgarRational;

    fn sub(self, rhs: &'b CgarRational) -> CgarRational {
        let mut result = self.0.clone();
        result -= &rhs.0;
        CgarRational(result)
    }
}

impl Sub for CgarRational {
    type Output = CgarRational;

    fn sub(mut self, rhs: CgarRational) -> CgarRational {
        self.0 -= rhs.0;
        self
    }
}

impl<'a, 'b> Mul<&'b CgarRational> for &'a CgarRational {
    type Output = CgarRational;

    fn mul(self, rhs: &'b CgarRational) -> CgarRational {
        let mut result = self.0.clone();
        result *= &rhs.0;
        CgarRational(result)
    }
}

impl Mul for CgarRational {
    type Output = CgarRational;

    fn mul(mut self, rhs: CgarRational) -> CgarRational {
        self.0 *= rhs.0;
        self
    }
}

impl<'a, 'b> Div<&'b CgarRational> for &'a CgarRational {
    type Output = CgarRational;

    fn div(self, rhs: &'b CgarRational) -> CgarRational {
        let mut result = self.0.clone();
        result /= &rhs.0;
        CgarRational(result)
    }
}

impl Div for CgarRational {
    type Output = CgarRational;

    fn div(mut self, rhs: CgarRational) -> CgarRational {
        self.0 /= rhs.0;
        self
    }
}

impl Neg for CgarRational {
    type Output = CgarRational;

    fn neg(self) -> CgarRational {
        CgarRational(-self.0)
    }
}

impl<'a> AddAssign<&'a CgarRational> for CgarRational {
    fn add_assign(&mut self, rhs: &'a CgarRational) {
        self.0 += &rhs.0;
    }
}

impl<'a> SubAssign<&'a CgarRational> for CgarRational {
    fn sub_assign(&mut self, rhs: &'a CgarRational) {
        self.0 -= &rhs.0;
    }
}

impl<'a> MulAssign<&'a CgarRational> for CgarRational {
    fn mul_assign(&mut self, rhs: &'a CgarRational) {
        self.0 *= &rhs.0;
    }
}

impl Zero for CgarRational {
    fn zero() -> Self {
        CgarRational(Rational::new())
    }

    fn is_zero(&self) -> bool {
        self.0.cmp0() == Ordering::Equal
    }
}

impl One for CgarRational {
    fn one() -> Self {
        CgarRational(Rational::from(1))
    }
}

impl ToPrimitive for CgarRational {
    fn to_i64(&self) -> Option<i64> {
        if *self.0.denom() == 1 {
            self.0.numer().to_i64()
        } else {
            None
        }
    }

    fn to_u64(&self) -> Option<u64> {
        if *self.0.denom() == 1 {
            self.0.numer().to_u64()
        } else {
            None
        }
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.0.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_decimal_round_trip() {
        let half = CgarRational::from_f64(0.5).unwrap();
        assert_eq!(half, CgarRational::from_num_den(1, 2));
        assert_eq!(half.to_f64(), Some(0.5));
        assert!(CgarRational::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn sign_and_integer_conversion() {
        let a = CgarRational::from(-3);
        assert_eq!(a.sign(), Sign::Negative);
        assert_eq!(a.abs(), CgarRational::from(3));
        assert_eq!(a.to_i64(), Some(-3));
        assert_eq!(CgarRational::from_num_den(1, 3).to_i64(), None);
        assert!(CgarRational::zero().is_zero());
    }

    #[test]
    fn third_times_three_is_exactly_one() {
        let third = CgarRational::from_num_den(1, 3);
        let sum = &(&third + &third) + &third;
        assert!(sum.is_one());
    }

    #[test]
    fn denominator_of_reduced_fraction() {
        assert_eq!(CgarRational::from_num_den(6, 4).denominator(), CgarRational::from(2));
        assert_eq!(CgarRational::from(-7).denominator(), CgarRational::from(1));
    }
}
