//! Declarative macros implementing the codec for user types
//!
//! - [`aggregate!`](crate::aggregate!): structs with bases and version-gated fields
//! - [`impl_variant!`](crate::impl_variant!): enums as tagged unions
//! - [`impl_enum!`](crate::impl_enum!): fieldless enums as their underlying integer
//! - [`impl_aggregate_codec!`](crate::impl_aggregate_codec!) /
//!   [`impl_aggregate_encode!`](crate::impl_aggregate_encode!): `Encode`/`Decode`
//!   glue for types implementing the aggregate traits by hand or through
//!   generated code

/// Implement the aggregate capability and the codec for a struct
///
/// Bases are embedded fields whose type is itself an aggregate. Fields take
/// an optional `[as_of, until]` range; `0` leaves a bound open.
///
/// ```
/// use verser_wire::{aggregate, from_bytes, to_bytes};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Header {
///     id: u32,
/// }
///
/// aggregate! {
///     Header {
///         field id;
///     }
/// }
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Record {
///     header: Header,
///     name: String,
///     score: u16,
/// }
///
/// aggregate! {
///     Record version 2 {
///         base header: Header;
///         field name;
///         field score [2, 0];
///     }
/// }
///
/// let record = Record {
///     header: Header { id: 7 },
///     name: "seven".into(),
///     score: 70,
/// };
/// let bytes = to_bytes(&record).unwrap();
/// assert_eq!(bytes[0], 2);
/// assert_eq!(from_bytes::<Record>(&bytes).unwrap(), record);
/// ```
///
/// Types without a `Default` use the `write_only` form, which implements
/// `Encode` but not `Decode`.
#[macro_export]
macro_rules! aggregate {
    (write_only $name:ident $(version $version:literal)? {
        $(base $base:ident : $base_ty:ty;)*
        $(field $field:ident $([$as_of:expr, $until:expr])?;)*
    }) => {
        $crate::aggregate!(@write $name [$($version)?] {
            $(base $base : $base_ty;)*
            $(field $field $([$as_of, $until])?;)*
        });
        $crate::impl_aggregate_encode!($name);
    };

    ($name:ident $(version $version:literal)? {
        $(base $base:ident : $base_ty:ty;)*
        $(field $field:ident $([$as_of:expr, $until:expr])?;)*
    }) => {
        $crate::aggregate!(@write $name [$($version)?] {
            $(base $base : $base_ty;)*
            $(field $field $([$as_of, $until])?;)*
        });

        impl $crate::AggregateRead for $name {
            fn read_members<R: ::std::io::Read>(
                &mut self,
                d: &mut $crate::Deserializer<R>,
            ) -> $crate::Result<()> {
                $(d.delegate_base(&mut self.$base)?;)*
                let mut gate = $crate::GateCursor::new(d.version());
                $(
                    if gate.enter($crate::aggregate!(@range $([$as_of, $until])?)) {
                        self.$field = $crate::Decode::decode(d)?;
                    }
                )*
                gate.finish();
                Ok(())
            }
        }

        $crate::impl_aggregate_codec!($name);
    };

    (@write $name:ident [$($version:literal)?] {
        $(base $base:ident : $base_ty:ty;)*
        $(field $field:ident $([$as_of:expr, $until:expr])?;)*
    }) => {
        impl $crate::Aggregate for $name {
            const SCHEMA: $crate::AggregateSchema = $crate::AggregateSchema {
                name: stringify!($name),
                version: $crate::aggregate!(@version $($version)?),
                bases: &[$(<$base_ty as $crate::Aggregate>::SCHEMA.name),*],
                fields: &[$(
                    $crate::FieldDescriptor::new(
                        stringify!($field),
                        $crate::aggregate!(@range $([$as_of, $until])?),
                    )
                ),*],
            };

            fn write_members<W: ::std::io::Write>(
                &self,
                s: &mut $crate::Serializer<W>,
            ) -> $crate::Result<()> {
                $(s.delegate_base::<$base_ty>(&self.$base)?;)*
                let mut gate = $crate::GateCursor::new(s.version());
                $(
                    if gate.enter($crate::aggregate!(@range $([$as_of, $until])?)) {
                        $crate::Encode::encode(&self.$field, s)?;
                    }
                )*
                gate.finish();
                Ok(())
            }
        }
    };

    (@range) => {
        $crate::VersionRange::UNBOUNDED
    };
    (@range [$as_of:expr, $until:expr]) => {
        $crate::VersionRange::between($as_of, $until)
    };

    (@version) => {
        $crate::UNVERSIONED
    };
    (@version $version:literal) => {
        $version
    };
}

/// Implement `Encode` for a type implementing [`Aggregate`](crate::Aggregate)
#[macro_export]
macro_rules! impl_aggregate_encode {
    ($name:ty) => {
        impl $crate::Encode for $name {
            fn encode<W: ::std::io::Write>(
                &self,
                s: &mut $crate::Serializer<W>,
            ) -> $crate::Result<()> {
                s.write_aggregate(self)
            }
        }
    };
}

/// Implement `Encode` and `Decode` for a type implementing
/// [`AggregateRead`](crate::AggregateRead)
#[macro_export]
macro_rules! impl_aggregate_codec {
    ($name:ty) => {
        $crate::impl_aggregate_encode!($name);

        impl $crate::Decode for $name {
            fn decode<R: ::std::io::Read>(
                d: &mut $crate::Deserializer<R>,
            ) -> $crate::Result<Self> {
                d.read_aggregate::<$name>()
            }
        }
    };
}

/// Encode an enum whose variants each wrap one payload as a tagged union
///
/// ```
/// use verser_wire::{from_bytes, impl_variant, to_bytes, Empty};
///
/// #[derive(Debug, PartialEq)]
/// enum Shape {
///     Circle(f32),
///     Label(String),
///     Nothing(Empty),
/// }
///
/// impl_variant!(Shape { Circle(f32), Label(String), Nothing(Empty) });
///
/// assert_eq!(to_bytes(&Shape::Nothing(Empty)).unwrap(), vec![2]);
/// let label = Shape::Label("x".into());
/// assert_eq!(from_bytes::<Shape>(&to_bytes(&label).unwrap()).unwrap(), label);
/// ```
#[macro_export]
macro_rules! impl_variant {
    ($name:ident { $($alt:ident($payload:ty)),+ $(,)? }) => {
        impl $crate::TaggedUnion for $name {
            const NAME: &'static str = stringify!($name);
            const ALTERNATIVES: &'static [&'static str] = &[$(stringify!($alt)),+];

            fn discriminant(&self) -> u8 {
                match self {
                    $(
                        $name::$alt(_) => $crate::alternative_index(
                            <Self as $crate::TaggedUnion>::ALTERNATIVES,
                            stringify!($alt),
                        ) as u8,
                    )+
                }
            }
        }

        const _: () = assert!(
            <$name as $crate::TaggedUnion>::ALTERNATIVES.len() <= $crate::MAX_ALTERNATIVES,
            "tagged union has too many alternatives"
        );

        impl $crate::Encode for $name {
            fn encode<W: ::std::io::Write>(
                &self,
                s: &mut $crate::Serializer<W>,
            ) -> $crate::Result<()> {
                s.writer()
                    .write_u8($crate::TaggedUnion::discriminant(self))?;
                match self {
                    $($name::$alt(value) => $crate::Encode::encode(value, s),)+
                }
            }
        }

        impl $crate::Decode for $name {
            fn decode<R: ::std::io::Read>(
                d: &mut $crate::Deserializer<R>,
            ) -> $crate::Result<Self> {
                const ALTERNATIVES: &[&str] = <$name as $crate::TaggedUnion>::ALTERNATIVES;
                let discriminant = d.read_discriminant(stringify!($name), ALTERNATIVES.len())?;
                $(
                    if discriminant as usize == $crate::alternative_index(ALTERNATIVES, stringify!($alt)) {
                        let payload: $payload = d.nested(<$payload as $crate::Decode>::decode)?;
                        return Ok($name::$alt(payload));
                    }
                )+
                Err($crate::ConversionError::DiscriminantOutOfRange {
                    type_name: stringify!($name),
                    discriminant,
                    alternatives: ALTERNATIVES.len(),
                }
                .into())
            }
        }
    };
}

/// Encode a fieldless enum as its underlying integer
///
/// ```
/// use verser_wire::{from_bytes, impl_enum, to_bytes};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// #[repr(u16)]
/// enum Level {
///     Low = 1,
///     High = 300,
/// }
///
/// impl_enum!(Level as u16 { Low, High });
///
/// assert_eq!(to_bytes(&Level::High).unwrap(), vec![0x2C, 0x01]);
/// assert!(from_bytes::<Level>(&[2, 0]).is_err());
/// ```
#[macro_export]
macro_rules! impl_enum {
    ($name:ident as $repr:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::Encode for $name {
            fn encode<W: ::std::io::Write>(
                &self,
                s: &mut $crate::Serializer<W>,
            ) -> $crate::Result<()> {
                let value: $repr = match self {
                    $($name::$variant => $name::$variant as $repr,)+
                };
                $crate::Encode::encode(&value, s)
            }
        }

        impl $crate::Decode for $name {
            fn decode<R: ::std::io::Read>(
                d: &mut $crate::Deserializer<R>,
            ) -> $crate::Result<Self> {
                let value = <$repr as $crate::Decode>::decode(d)?;
                $(
                    if value == $name::$variant as $repr {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::ConversionError::InvalidEnumValue {
                    type_name: stringify!($name),
                    value: value as i128,
                }
                .into())
            }
        }
    };
}
