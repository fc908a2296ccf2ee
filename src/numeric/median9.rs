/// Median of a fixed 9-element window via a compare-exchange sorting
/// network (the classic `opt_med9` network), rather than a general sort.
///
/// NaN is outside the contract — callers guarantee NaN-free input.
pub fn median_of_9(p: &mut [f32; 9]) -> f32 {
    macro_rules! sort2 {
        ($i:expr, $j:expr) => {
            if p[$i] > p[$j] {
                p.swap($i, $j);
            }
        };
    }

    sort2!(1, 2);
    sort2!(4, 5);
    sort2!(7, 8);
    sort2!(0, 1);
    sort2!(3, 4);
    sort2!(6, 7);
    sort2!(1, 2);
    sort2!(4, 5);
    sort2!(7, 8);
    sort2!(0, 3);
    sort2!(5, 8);
    sort2!(4, 7);
    sort2!(3, 6);
    sort2!(1, 4);
    sort2!(2, 5);
    sort2!(4, 7);
    sort2!(4, 2);
    sort2!(6, 4);
    sort2!(4, 2);

    p[4]
}
