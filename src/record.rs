/// Declares a struct together with its [`Record`](crate::Record),
/// [`Encode`](crate::Encode) and [`Decode`](crate::Decode) implementations.
///
/// A field may carry a tag after its type, `field: Type => "tag"`, see
/// [`FieldSpec`](crate::FieldSpec) for the tag syntax. Only plain `pub`
/// fields are encoded and decoded.
///
/// Records used inside `Vec`, `Option` or map values must implement
/// `Default`.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{marshal, record, unmarshal};
///
/// record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct FileEntry {
///         pub length: u64,
///         pub path: Vec<String>,
///         pub md5sum: String => "md5sum,omitempty",
///     }
/// }
///
/// let entry = FileEntry {
///     length: 1024,
///     path: vec!["dir".into(), "file.txt".into()],
///     md5sum: String::new(),
/// };
///
/// let encoded = marshal(&entry).unwrap();
/// assert_eq!(encoded, b"d6:lengthi1024e4:pathl3:dir8:file.txtee");
///
/// let mut decoded = FileEntry::default();
/// unmarshal(&encoded, &mut decoded).unwrap();
/// assert_eq!(decoded, entry);
/// ```
#[macro_export]
macro_rules! record {
    (@tag) => {
        ::core::option::Option::None
    };
    (@tag $tag:literal) => {
        ::core::option::Option::Some($tag)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(=> $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn record_name(&self) -> &'static str {
                ::core::stringify!($name)
            }

            fn field_specs(&self) -> &'static [$crate::FieldSpec] {
                static SPECS: ::std::sync::OnceLock<::std::vec::Vec<$crate::FieldSpec>> =
                    ::std::sync::OnceLock::new();
                SPECS.get_or_init(|| {
                    ::std::vec![
                        $(
                            $crate::FieldSpec::declare(
                                ::core::stringify!($field),
                                ::core::stringify!($field_vis),
                                $crate::record!(@tag $($tag)?),
                            ),
                        )*
                    ]
                })
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> ::core::option::Option<&dyn $crate::Encode> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return ::core::option::Option::Some(&self.$field as &dyn $crate::Encode);
                    }
                    position += 1;
                )*
                ::core::option::Option::None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn $crate::Decode> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return ::core::option::Option::Some(&mut self.$field as &mut dyn $crate::Decode);
                    }
                    position += 1;
                )*
                ::core::option::Option::None
            }
        }

        impl $crate::Encode for $name {
            fn shape(&self) -> $crate::Shape<'_> {
                $crate::Shape::Record(self)
            }
        }

        impl $crate::Decode for $name {
            fn target(&mut self) -> $crate::Target<'_> {
                $crate::Target::Record(self)
            }
        }
    };
}
