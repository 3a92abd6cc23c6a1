//! One-dimensional minimization: downhill bracketing followed by Brent's
//! method (parabolic interpolation with golden-section fallback).

const GOLDEN: f64 = 1.618034;
const GOLDEN_SECTION: f64 = 0.381_966_0;
const GROW_LIMIT: f64 = 110.0;
const TINY: f64 = 1e-21;
const MIN_TOL: f64 = 1e-11;
const MAX_BRACKET_ITERATIONS: usize = 1000;
const MAX_BRENT_ITERATIONS: usize = 500;

/// Three abscissae with `f(b) <= f(a)` and `f(b) <= f(c)` when bracketing
/// succeeded; `a` and `c` are not ordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub fa: f64,
    pub fb: f64,
    pub fc: f64,
}

/// Walks downhill from `xa`, `xb` until the function turns up again.
/// Stops after a fixed iteration budget and returns the last triple.
pub fn bracket(f: &impl Fn(f64) -> f64, xa: f64, xb: f64) -> Bracket {
    let (mut xa, mut xb) = (xa, xb);
    let (mut fa, mut fb) = (f(xa), f(xb));
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut xc = xb + GOLDEN * (xb - xa);
    let mut fc = f(xc);

    let mut iterations = 0;
    while fc < fb {
        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < TINY { 2.0 * TINY } else { 2.0 * val };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + GROW_LIMIT * (xc - xb);

        if iterations >= MAX_BRACKET_ITERATIONS {
            break;
        }
        iterations += 1;

        let mut fw;
        if (w - xc) * (xb - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                return Bracket { a: xb, b: w, c: xc, fa: fb, fb: fw, fc };
            } else if fw > fb {
                return Bracket { a: xa, b: xb, c: w, fa, fb, fc: fw };
            }
            w = xc + GOLDEN * (xc - xb);
            fw = f(w);
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = f(w);
        } else if (w - wlim) * (xc - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                xb = xc;
                xc = w;
                w = xc + GOLDEN * (xc - xb);
                fb = fc;
                fc = fw;
                fw = f(w);
            }
        } else {
            w = xc + GOLDEN * (xc - xb);
            fw = f(w);
        }
        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }

    Bracket { a: xa, b: xb, c: xc, fa, fb, fc }
}

/// Brent's minimization inside `bracket` with relative tolerance `tol`.
/// Returns `(x_min, f_min, iterations)`.
pub fn brent(f: &impl Fn(f64) -> f64, bracket: &Bracket, tol: f64) -> (f64, f64, usize) {
    let (mut a, mut b) = if bracket.a < bracket.c {
        (bracket.a, bracket.c)
    } else {
        (bracket.c, bracket.a)
    };
    let (mut x, mut w, mut v) = (bracket.b, bracket.b, bracket.b);
    let (mut fx, mut fw, mut fv) = (bracket.fb, bracket.fb, bracket.fb);
    let mut deltax: f64 = 0.0;
    let mut rat: f64 = 0.0;

    let mut iterations = 0;
    while iterations < MAX_BRENT_ITERATIONS {
        let tol1 = tol * x.abs() + MIN_TOL;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);
        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            break;
        }

        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = GOLDEN_SECTION * deltax;
        } else {
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let previous = deltax;
            deltax = rat;
            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * previous).abs() {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = GOLDEN_SECTION * deltax;
            }
        }

        let u = if rat.abs() < tol1 {
            if rat >= 0.0 {
                x + tol1
            } else {
                x - tol1
            }
        } else {
            x + rat
        };
        let fu = f(u);

        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
        iterations += 1;
    }

    (x, fx, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_contains_minimum() {
        let f = |x: f64| (x - 3.2).powi(2);
        let br = bracket(&f, 0.0, 1.0);
        let (lo, hi) = (br.a.min(br.c), br.a.max(br.c));
        assert!(lo < 3.2 && 3.2 < hi, "{:?}", br);
        assert!(br.fb <= br.fa && br.fb <= br.fc);
    }

    #[test]
    fn test_brent_finds_quadratic_minimum() {
        let f = |x: f64| (x + 1.5).powi(2) + 0.25;
        let br = bracket(&f, 0.0, 1.0);
        let (x, fx, _) = brent(&f, &br, 1e-8);
        assert!((x + 1.5).abs() < 1e-6, "x = {}", x);
        assert!((fx - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_brent_on_non_smooth_function() {
        let f = |x: f64| (x - 0.7).abs();
        let br = bracket(&f, 0.0, 1.0);
        let (x, _, _) = brent(&f, &br, 1e-6);
        assert!((x - 0.7).abs() < 1e-4, "x = {}", x);
    }

    #[test]
    fn test_flat_infinite_function_terminates() {
        let f = |_: f64| f64::INFINITY;
        let br = bracket(&f, 0.0, 1.0);
        let (_, fx, iterations) = brent(&f, &br, 1e-2);
        assert_eq!(fx, f64::INFINITY);
        assert!(iterations < MAX_BRENT_ITERATIONS);
    }
}
