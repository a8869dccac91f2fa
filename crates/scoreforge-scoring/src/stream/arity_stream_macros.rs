//! Macros for generating arity-specific constraint streams.
//!
//! Uni/Bi/Tri/Quad streams share every operation except the ones that
//! change the arity by one (`join`, `expand`), which the Quad stream lacks,
//! and the few uni-only operations defined in `uni_stream.rs`.
//!
//! Every generated method records a node in the factory plan and returns
//! a stream positioned on it. Element `$i` of a tuple is downcast to `$t`.

/// Generates the stream struct, its builder and the common operations.
macro_rules! impl_arity_stream {
    (
        $(#[$meta:meta])*
        $stream:ident, $builder:ident, [$($t:ident : $i:tt),+]
    ) => {
        $(#[$meta])*
        pub struct $stream<'f, S: scoreforge_core::PlanningSolution, $($t),+> {
            pub(crate) factory: &'f $crate::stream::ConstraintFactory<S>,
            pub(crate) node: Option<usize>,
            _phantom: std::marker::PhantomData<fn() -> ($($t,)+)>,
        }

        impl<'f, S: scoreforge_core::PlanningSolution, $($t),+> Clone for $stream<'f, S, $($t),+> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<'f, S: scoreforge_core::PlanningSolution, $($t),+> Copy for $stream<'f, S, $($t),+> {}

        impl<'f, S: scoreforge_core::PlanningSolution, $($t),+> std::fmt::Debug
            for $stream<'f, S, $($t),+>
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($stream))
                    .field("node", &self.node)
                    .finish()
            }
        }

        impl<'f, S, $($t),+> $stream<'f, S, $($t),+>
        where
            S: scoreforge_core::PlanningSolution,
            $($t: 'static),+
        {
            pub(crate) fn at(
                factory: &'f $crate::stream::ConstraintFactory<S>,
                node: Option<usize>,
            ) -> Self {
                Self {
                    factory,
                    node,
                    _phantom: std::marker::PhantomData,
                }
            }

            /// Index of the plan node this stream reads, `None` if the stream
            /// could not be built. Streams that share a node share its index.
            pub fn node(&self) -> Option<usize> {
                self.node
            }

            fn mapper<K, F>(mapping: F) -> ($crate::network::Mapper, $crate::stream::Token)
            where
                K: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F: $crate::stream::TupleFn<($($t,)+), K>,
            {
                let erased = $crate::stream::function::erase::<($($t,)+), K, F>(mapping);
                let mapping = erased.func;
                let mapper: $crate::network::Mapper =
                    std::sync::Arc::new(move |facts: &[$crate::network::Element]| {
                        $crate::network::Element::value(mapping(facts))
                    });
                (mapper, erased.token)
            }

            /// Keeps the tuples accepted by `predicate`.
            ///
            /// Two filters share a node when their predicates are the same
            /// stateless closure or clones of one [`Shared`](crate::stream::Shared).
            pub fn filter<F>(self, predicate: F) -> Self
            where
                F: $crate::stream::TupleFn<($($t,)+), bool>,
            {
                let erased = $crate::stream::function::erase::<($($t,)+), bool, F>(predicate);
                let token = erased.token;
                let predicate: $crate::network::Predicate = erased.func;
                let node = self.factory.node(
                    "filter",
                    &[self.node],
                    ::smallvec::smallvec![token],
                    |parents| $crate::stream::factory::NodeTemplate::Filter {
                        parent: parents[0],
                        predicate,
                    },
                );
                Self::at(self.factory, node)
            }

            /// Keeps the tuples for which an assigned `E` matches `joiner`.
            pub fn if_exists<E: 'static>(self, joiner: $crate::stream::Joiner<($($t,)+), E>) -> Self {
                let other = self.factory.for_each::<E>();
                self.exists(true, other, joiner)
            }

            /// Keeps the tuples for which no assigned `E` matches `joiner`.
            pub fn if_not_exists<E: 'static>(self, joiner: $crate::stream::Joiner<($($t,)+), E>) -> Self {
                let other = self.factory.for_each::<E>();
                self.exists(false, other, joiner)
            }

            pub fn if_exists_including_unassigned<E: 'static>(
                self,
                joiner: $crate::stream::Joiner<($($t,)+), E>,
            ) -> Self {
                let other = self.factory.for_each_including_unassigned::<E>();
                self.exists(true, other, joiner)
            }

            pub fn if_not_exists_including_unassigned<E: 'static>(
                self,
                joiner: $crate::stream::Joiner<($($t,)+), E>,
            ) -> Self {
                let other = self.factory.for_each_including_unassigned::<E>();
                self.exists(false, other, joiner)
            }

            /// Keeps the tuples for which some tuple of `other` matches.
            pub fn if_exists_stream<E: 'static>(
                self,
                other: $crate::stream::UniStream<'f, S, E>,
                joiner: $crate::stream::Joiner<($($t,)+), E>,
            ) -> Self {
                self.exists(true, other, joiner)
            }

            pub fn if_not_exists_stream<E: 'static>(
                self,
                other: $crate::stream::UniStream<'f, S, E>,
                joiner: $crate::stream::Joiner<($($t,)+), E>,
            ) -> Self {
                self.exists(false, other, joiner)
            }

            pub(crate) fn exists<E: 'static>(
                self,
                should_exist: bool,
                other: $crate::stream::UniStream<'f, S, E>,
                joiner: $crate::stream::Joiner<($($t,)+), E>,
            ) -> Self {
                let op = if should_exist { "if_exists" } else { "if_not_exists" };
                let node = self.factory.node(
                    op,
                    &[self.node, other.node],
                    joiner.tokens(),
                    |parents| $crate::stream::factory::NodeTemplate::Exists {
                        left: parents[0],
                        right: parents[1],
                        should_exist,
                        indexer: joiner.indexer(),
                    },
                );
                Self::at(self.factory, node)
            }

            fn grouped(
                self,
                keys: Vec<($crate::network::Mapper, $crate::stream::Token)>,
                collectors: Vec<(
                    std::sync::Arc<dyn $crate::network::ErasedCollector>,
                    ::smallvec::SmallVec<[$crate::stream::Token; 2]>,
                )>,
            ) -> Option<usize> {
                let mut tokens: ::smallvec::SmallVec<[$crate::stream::Token; 4]> =
                    keys.iter().map(|(_, token)| *token).collect();
                tokens.push($crate::stream::Token::Const("collect"));
                for (_, own) in &collectors {
                    tokens.extend_from_slice(own);
                }
                self.factory.node("group_by", &[self.node], tokens, |parents| {
                    $crate::stream::factory::NodeTemplate::Group {
                        parent: parents[0],
                        keys: keys.into_iter().map(|(key, _)| key).collect(),
                        collectors: collectors.into_iter().map(|(c, _)| c).collect(),
                    }
                })
            }

            /// Groups by `key`; one tuple per distinct key.
            pub fn group_by<K, F>(self, key: F) -> $crate::stream::UniStream<'f, S, K>
            where
                K: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F: $crate::stream::TupleFn<($($t,)+), K>,
            {
                let node = self.grouped(vec![Self::mapper(key)], Vec::new());
                $crate::stream::UniStream::at(self.factory, node)
            }

            /// Groups by `key` and aggregates each group with `collector`.
            pub fn group_by_with<K, F, Col>(
                self,
                key: F,
                collector: Col,
            ) -> $crate::stream::BiStream<'f, S, K, Col::Result>
            where
                K: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F: $crate::stream::TupleFn<($($t,)+), K>,
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let collectors = vec![$crate::stream::collector::erase_collector(collector)];
                let node = self.grouped(vec![Self::mapper(key)], collectors);
                $crate::stream::BiStream::at(self.factory, node)
            }

            pub fn group_by_with2<K, F, C1, C2>(
                self,
                key: F,
                first: C1,
                second: C2,
            ) -> $crate::stream::TriStream<'f, S, K, C1::Result, C2::Result>
            where
                K: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F: $crate::stream::TupleFn<($($t,)+), K>,
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let collectors = vec![
                    $crate::stream::collector::erase_collector(first),
                    $crate::stream::collector::erase_collector(second),
                ];
                let node = self.grouped(vec![Self::mapper(key)], collectors);
                $crate::stream::TriStream::at(self.factory, node)
            }

            /// Groups by two keys.
            pub fn group_by2<K1, K2, F1, F2>(
                self,
                first: F1,
                second: F2,
            ) -> $crate::stream::BiStream<'f, S, K1, K2>
            where
                K1: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                K2: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F1: $crate::stream::TupleFn<($($t,)+), K1>,
                F2: $crate::stream::TupleFn<($($t,)+), K2>,
            {
                let keys = vec![Self::mapper(first), Self::mapper(second)];
                let node = self.grouped(keys, Vec::new());
                $crate::stream::BiStream::at(self.factory, node)
            }

            pub fn group_by2_with<K1, K2, F1, F2, Col>(
                self,
                first: F1,
                second: F2,
                collector: Col,
            ) -> $crate::stream::TriStream<'f, S, K1, K2, Col::Result>
            where
                K1: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                K2: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F1: $crate::stream::TupleFn<($($t,)+), K1>,
                F2: $crate::stream::TupleFn<($($t,)+), K2>,
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let keys = vec![Self::mapper(first), Self::mapper(second)];
                let collectors = vec![$crate::stream::collector::erase_collector(collector)];
                let node = self.grouped(keys, collectors);
                $crate::stream::TriStream::at(self.factory, node)
            }

            /// Aggregates the whole stream into one tuple.
            ///
            /// The tuple exists while the stream is non-empty.
            pub fn group_by_collect<Col>(
                self,
                collector: Col,
            ) -> $crate::stream::UniStream<'f, S, Col::Result>
            where
                Col: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let collectors = vec![$crate::stream::collector::erase_collector(collector)];
                let node = self.grouped(Vec::new(), collectors);
                $crate::stream::UniStream::at(self.factory, node)
            }

            pub fn group_by_collect2<C1, C2>(
                self,
                first: C1,
                second: C2,
            ) -> $crate::stream::BiStream<'f, S, C1::Result, C2::Result>
            where
                C1: $crate::stream::collector::Collector<($($t,)+)>,
                C2: $crate::stream::collector::Collector<($($t,)+)>,
            {
                let collectors = vec![
                    $crate::stream::collector::erase_collector(first),
                    $crate::stream::collector::erase_collector(second),
                ];
                let node = self.grouped(Vec::new(), collectors);
                $crate::stream::BiStream::at(self.factory, node)
            }

            /// Replaces every tuple by one computed value.
            pub fn map<R, F>(self, mapping: F) -> $crate::stream::UniStream<'f, S, R>
            where
                R: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F: $crate::stream::TupleFn<($($t,)+), R>,
            {
                let (mapper, token) = Self::mapper(mapping);
                let node = self.factory.node(
                    "map",
                    &[self.node],
                    ::smallvec::smallvec![token],
                    |parents| $crate::stream::factory::NodeTemplate::Map {
                        parent: parents[0],
                        mappers: vec![mapper],
                        keep_input: false,
                    },
                );
                $crate::stream::UniStream::at(self.factory, node)
            }

            /// Replaces every tuple by a pair of computed values.
            pub fn map2<R1, R2, F1, F2>(
                self,
                first: F1,
                second: F2,
            ) -> $crate::stream::BiStream<'f, S, R1, R2>
            where
                R1: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                R2: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F1: $crate::stream::TupleFn<($($t,)+), R1>,
                F2: $crate::stream::TupleFn<($($t,)+), R2>,
            {
                let (first, first_token) = Self::mapper(first);
                let (second, second_token) = Self::mapper(second);
                let node = self.factory.node(
                    "map",
                    &[self.node],
                    ::smallvec::smallvec![first_token, second_token],
                    |parents| $crate::stream::factory::NodeTemplate::Map {
                        parent: parents[0],
                        mappers: vec![first, second],
                        keep_input: false,
                    },
                );
                $crate::stream::BiStream::at(self.factory, node)
            }

            /// Collapses equal tuples into one.
            pub fn distinct(self) -> Self {
                let node = self.factory.node(
                    "distinct",
                    &[self.node],
                    ::smallvec::SmallVec::new(),
                    |parents| $crate::stream::factory::NodeTemplate::Distinct { parent: parents[0] },
                );
                Self::at(self.factory, node)
            }

            /// Every tuple of this stream and of `other`, duplicates kept.
            pub fn concat(self, other: Self) -> Self {
                let node = self.factory.node(
                    "concat",
                    &[self.node, other.node],
                    ::smallvec::SmallVec::new(),
                    |parents| $crate::stream::factory::NodeTemplate::Concat {
                        left: parents[0],
                        right: parents[1],
                    },
                );
                Self::at(self.factory, node)
            }

            /// Subtracts `weight` for every tuple.
            pub fn penalize(self, weight: S::Score) -> $builder<'f, S, $($t),+> {
                $builder::new(self, weight, scoreforge_core::ImpactType::Penalty, None)
            }

            /// Subtracts `weight` multiplied by `match_weight` for every tuple.
            pub fn penalize_with<F>(self, weight: S::Score, match_weight: F) -> $builder<'f, S, $($t),+>
            where
                F: Fn($(&$t),+) -> <S::Score as scoreforge_core::Score>::Multiplier
                    + Send
                    + Sync
                    + 'static,
            {
                let matcher = Self::matcher(match_weight);
                $builder::new(self, weight, scoreforge_core::ImpactType::Penalty, Some(matcher))
            }

            /// Adds `weight` for every tuple.
            pub fn reward(self, weight: S::Score) -> $builder<'f, S, $($t),+> {
                $builder::new(self, weight, scoreforge_core::ImpactType::Reward, None)
            }

            pub fn reward_with<F>(self, weight: S::Score, match_weight: F) -> $builder<'f, S, $($t),+>
            where
                F: Fn($(&$t),+) -> <S::Score as scoreforge_core::Score>::Multiplier
                    + Send
                    + Sync
                    + 'static,
            {
                let matcher = Self::matcher(match_weight);
                $builder::new(self, weight, scoreforge_core::ImpactType::Reward, Some(matcher))
            }

            /// Adds `weight` for every tuple; a negative weight penalizes.
            pub fn impact(self, weight: S::Score) -> $builder<'f, S, $($t),+> {
                $builder::new(self, weight, scoreforge_core::ImpactType::Mixed, None)
            }

            pub fn impact_with<F>(self, weight: S::Score, match_weight: F) -> $builder<'f, S, $($t),+>
            where
                F: Fn($(&$t),+) -> <S::Score as scoreforge_core::Score>::Multiplier
                    + Send
                    + Sync
                    + 'static,
            {
                let matcher = Self::matcher(match_weight);
                $builder::new(self, weight, scoreforge_core::ImpactType::Mixed, Some(matcher))
            }

            fn matcher<F>(match_weight: F) -> $crate::constraint::Matcher<S::Score>
            where
                F: Fn($(&$t),+) -> <S::Score as scoreforge_core::Score>::Multiplier
                    + Send
                    + Sync
                    + 'static,
            {
                std::sync::Arc::new(move |facts: &[$crate::network::Element]| {
                    match_weight($(facts[$i].get::<$t>()),+)
                })
            }
        }

        /// Finishes a stream into a named, weighted constraint.
        pub struct $builder<'f, S: scoreforge_core::PlanningSolution, $($t),+> {
            factory: &'f $crate::stream::ConstraintFactory<S>,
            node: Option<usize>,
            weight: S::Score,
            impact: scoreforge_core::ImpactType,
            matcher: Option<$crate::constraint::Matcher<S::Score>>,
            justifier: Option<$crate::constraint::Justifier<S::Score>>,
            indicter: Option<$crate::constraint::Indicter>,
            problems: Vec<&'static str>,
            _phantom: std::marker::PhantomData<fn() -> ($($t,)+)>,
        }

        impl<'f, S, $($t),+> $builder<'f, S, $($t),+>
        where
            S: scoreforge_core::PlanningSolution,
            $($t: 'static),+
        {
            fn new(
                stream: $stream<'f, S, $($t),+>,
                weight: S::Score,
                impact: scoreforge_core::ImpactType,
                matcher: Option<$crate::constraint::Matcher<S::Score>>,
            ) -> Self {
                Self {
                    factory: stream.factory,
                    node: stream.node,
                    weight,
                    impact,
                    matcher,
                    justifier: None,
                    indicter: None,
                    problems: Vec::new(),
                    _phantom: std::marker::PhantomData,
                }
            }

            /// Replaces the default justification (the matched facts) of
            /// every match.
            pub fn justify_with<J, F>(mut self, justify: F) -> Self
            where
                J: $crate::api::analysis::ConstraintJustification,
                F: Fn($(&$t,)+ S::Score) -> J + Send + Sync + 'static,
            {
                if self.justifier.is_some() {
                    self.problems.push(
                        "already has a justification mapping. \
                         Maybe the constraint calls justify_with() twice?",
                    );
                    return self;
                }
                self.justifier = Some(std::sync::Arc::new(
                    move |facts: &[$crate::network::Element], impact: S::Score|
                        -> std::sync::Arc<dyn $crate::api::analysis::ConstraintJustification>
                    {
                        std::sync::Arc::new(justify($(facts[$i].get::<$t>(),)+ impact))
                    },
                ));
                self
            }

            /// Replaces the default indicted objects (the matched facts) of
            /// every match. Returned objects are compared by value.
            pub fn indict_with<T, I, F>(mut self, indict: F) -> Self
            where
                T: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                I: IntoIterator<Item = T>,
                F: Fn($(&$t),+) -> I + Send + Sync + 'static,
            {
                if self.indicter.is_some() {
                    self.problems.push(
                        "already has an indictment mapping. \
                         Maybe the constraint calls indict_with() twice?",
                    );
                    return self;
                }
                self.indicter = Some(std::sync::Arc::new(
                    move |facts: &[$crate::network::Element]| {
                        indict($(facts[$i].get::<$t>()),+)
                            .into_iter()
                            .map($crate::network::Element::value)
                            .collect()
                    },
                ));
                self
            }

            /// Names the constraint within the solution's constraint package.
            pub fn as_constraint(self, name: &str) -> $crate::Constraint<S::Score> {
                let package = self.factory.default_package().to_string();
                self.as_constraint_in(&package, name)
            }

            pub fn as_constraint_in(self, package: &str, name: &str) -> $crate::Constraint<S::Score> {
                let constraint_ref = scoreforge_core::ConstraintRef::new(package, name);
                for problem in &self.problems {
                    self.factory
                        .record_error(format!("The constraint ({}) {}", constraint_ref, problem));
                }
                $crate::Constraint {
                    constraint_ref,
                    weight: self.weight,
                    impact: self.impact,
                    node: self.node,
                    matcher: self.matcher,
                    justifier: self.justifier,
                    indicter: self.indicter,
                }
            }
        }
    };
}

/// Generates `join` and `expand`, which add one element to the tuple.
macro_rules! impl_stream_join {
    ($stream:ident => $next:ident, [$($t:ident),+]) => {
        impl<'f, S, $($t),+> $stream<'f, S, $($t),+>
        where
            S: scoreforge_core::PlanningSolution,
            $($t: 'static),+
        {
            /// Pairs every tuple with each assigned `E` matching `joiner`.
            pub fn join<E: 'static>(
                self,
                joiner: $crate::stream::Joiner<($($t,)+), E>,
            ) -> $crate::stream::$next<'f, S, $($t,)+ E> {
                let other = self.factory.for_each::<E>();
                self.join_stream(other, joiner)
            }

            /// Pairs every tuple with each tuple of `other` matching `joiner`.
            pub fn join_stream<E: 'static>(
                self,
                other: $crate::stream::UniStream<'f, S, E>,
                joiner: $crate::stream::Joiner<($($t,)+), E>,
            ) -> $crate::stream::$next<'f, S, $($t,)+ E> {
                let node = self.factory.node(
                    "join",
                    &[self.node, other.node],
                    joiner.tokens(),
                    |parents| $crate::stream::factory::NodeTemplate::Join {
                        left: parents[0],
                        right: parents[1],
                        indexer: joiner.indexer(),
                    },
                );
                $crate::stream::$next::at(self.factory, node)
            }

            /// Appends a value computed from the tuple.
            pub fn expand<E, F>(self, mapping: F) -> $crate::stream::$next<'f, S, $($t,)+ E>
            where
                E: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                F: $crate::stream::TupleFn<($($t,)+), E>,
            {
                let (mapper, token) = Self::mapper(mapping);
                let node = self.factory.node(
                    "expand",
                    &[self.node],
                    ::smallvec::smallvec![token],
                    |parents| $crate::stream::factory::NodeTemplate::Map {
                        parent: parents[0],
                        mappers: vec![mapper],
                        keep_input: true,
                    },
                );
                $crate::stream::$next::at(self.factory, node)
            }
        }
    };
}

/// Generates `flatten_last`, which replaces the last element by each of
/// the values it expands to.
macro_rules! impl_stream_flatten {
    ($stream:ident, [$($p:ident),*] $last:ident) => {
        impl<'f, S, $($p,)* $last> $stream<'f, S, $($p,)* $last>
        where
            S: scoreforge_core::PlanningSolution,
            $($p: 'static,)*
            $last: 'static,
        {
            pub fn flatten_last<Y, I, F>(self, flatten: F) -> $stream<'f, S, $($p,)* Y>
            where
                Y: scoreforge_core::DomainObject + Eq + std::hash::Hash,
                I: IntoIterator<Item = Y> + 'static,
                F: $crate::stream::TupleFn<($last,), I>,
            {
                let erased = $crate::stream::function::erase::<($last,), I, F>(flatten);
                let token = erased.token;
                let flatten = erased.func;
                let flattener: $crate::network::Flattener =
                    std::sync::Arc::new(move |last: &$crate::network::Element| {
                        flatten(std::slice::from_ref(last))
                            .into_iter()
                            .map($crate::network::Element::value)
                            .collect()
                    });
                let node = self.factory.node(
                    "flatten_last",
                    &[self.node],
                    ::smallvec::smallvec![token],
                    |parents| $crate::stream::factory::NodeTemplate::FlattenLast {
                        parent: parents[0],
                        flattener,
                    },
                );
                $stream::at(self.factory, node)
            }
        }
    };
}
