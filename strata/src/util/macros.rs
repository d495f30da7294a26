/// Implement another macro for tuples of types recursively.
///
/// Each element is a pair of a type parameter name and a lowercase binding name, so the
/// implementing macro can destructure two tuples side by side.
#[doc(hidden)]
#[macro_export]
macro_rules! for_every_tuple {
    ($m:ident !! $head_ty:ident $head_var:ident) => {
        $m!($head_ty $head_var);
    };
    ($m:ident !! $head_ty:ident $head_var:ident, $($tail_ty:ident $tail_var:ident),*) => (
        $m!($head_ty $head_var, $( $tail_ty $tail_var ),*);
        $crate::for_every_tuple!($m !! $( $tail_ty $tail_var ),*);
    );
}

/// Apply a macro to all tuple arities from 1 to 8.
#[doc(hidden)]
#[macro_export]
macro_rules! all_tuples {
    ($m:ident) => {
        $crate::for_every_tuple!($m !! A a, B b, C c, D d, E e, F f, G g, H h);
    };
}
