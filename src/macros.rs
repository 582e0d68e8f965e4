macro_rules! all_the_tuples {
    ($name:ident) => {
        $name!([]);
        $name!([T1]);
        $name!([T1, T2]);
        $name!([T1, T2, T3]);
        $name!([T1, T2, T3, T4]);
        $name!([T1, T2, T3, T4, T5]);
        $name!([T1, T2, T3, T4, T5, T6]);
        $name!([T1, T2, T3, T4, T5, T6, T7]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12]);
    };
}

/// Declares that a concrete type can be handed out as one or more contracts.
///
/// # Syntax
/// ```text
/// implements!(Type => dyn Contract [, dyn OtherContract ...])
/// ```
///
/// # Examples
/// ```rust
/// use ioc_bootstrap::implements;
///
/// trait UserRepo: Send + Sync {}
/// trait Health: Send + Sync {}
///
/// struct PostgresUserRepo;
///
/// impl UserRepo for PostgresUserRepo {}
/// impl Health for PostgresUserRepo {}
///
/// implements!(PostgresUserRepo => dyn UserRepo, dyn Health);
/// ```
#[macro_export]
macro_rules! implements {
    ($ty:ty => $($contract:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$contract> for $ty {
                #[inline]
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$contract> {
                    self
                }
            }
        )+
    };
}
