pub(crate) fn sqr(x: f64) -> f64 {
    x * x
}

pub trait BoolExt {
    fn if_else<T>(self, true_val: T, false_val: T) -> T;
}

impl BoolExt for bool {
    fn if_else<T>(self, true_val: T, false_val: T) -> T {
        if self {
            true_val
        } else {
            false_val
        }
    }
}
