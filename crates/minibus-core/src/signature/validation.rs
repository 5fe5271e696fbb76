use crate::proto::Type;

use super::{MAX_CONTAINER_DEPTH, MAX_DEPTH, MAX_SIGNATURE, SignatureError, SignatureErrorKind};

const NONE: u8 = 0;
const ARRAY: u8 = 1;
const STRUCT: u8 = 2;
const DICT: u8 = 3;

/// Validate a signature against the D-Bus grammar.
///
/// This is a `const fn` so that signature literals can be checked at
/// compile time through [`Signature::new_const`].
///
/// [`Signature::new_const`]: super::Signature::new_const
pub(super) const fn validate(bytes: &[u8]) -> Result<(), SignatureError> {
    use SignatureErrorKind::*;

    if bytes.len() > MAX_SIGNATURE {
        return Err(SignatureError::new(SignatureTooLong));
    }

    // Container stack, kind and field count per level.
    let mut kinds = [NONE; MAX_DEPTH];
    let mut fields = [0u8; MAX_DEPTH];
    let mut depth = 0usize;
    let mut arrays = 0usize;
    let mut structs = 0usize;
    let mut n = 0usize;

    while n < bytes.len() {
        let t = Type::new(bytes[n]);
        n += 1;

        let mut is_basic = t.is_basic();

        if !is_basic && !matches!(t, Type::VARIANT) {
            match t {
                Type::ARRAY => {
                    if depth == MAX_DEPTH || arrays == MAX_CONTAINER_DEPTH {
                        return Err(SignatureError::new(ExceededMaximumDepth));
                    }

                    kinds[depth] = ARRAY;
                    fields[depth] = 0;
                    depth += 1;
                    arrays += 1;
                    continue;
                }
                Type::OPEN_PAREN => {
                    if depth == MAX_DEPTH || structs == MAX_CONTAINER_DEPTH {
                        return Err(SignatureError::new(ExceededMaximumDepth));
                    }

                    kinds[depth] = STRUCT;
                    fields[depth] = 0;
                    depth += 1;
                    structs += 1;
                    continue;
                }
                Type::CLOSE_PAREN => {
                    if depth == 0 {
                        return Err(SignatureError::new(StructEndedButNotStarted));
                    }

                    depth -= 1;

                    match kinds[depth] {
                        STRUCT => {}
                        ARRAY => return Err(SignatureError::new(MissingArrayElementType)),
                        _ => return Err(SignatureError::new(StructEndedButNotStarted)),
                    }

                    if fields[depth] == 0 {
                        return Err(SignatureError::new(StructHasNoFields));
                    }

                    structs -= 1;
                }
                Type::OPEN_BRACE => {
                    if depth == MAX_DEPTH {
                        return Err(SignatureError::new(ExceededMaximumDepth));
                    }

                    kinds[depth] = DICT;
                    fields[depth] = 0;
                    depth += 1;
                    continue;
                }
                Type::CLOSE_BRACE => {
                    if depth == 0 {
                        return Err(SignatureError::new(DictEndedButNotStarted));
                    }

                    depth -= 1;

                    match kinds[depth] {
                        DICT => {}
                        ARRAY => return Err(SignatureError::new(MissingArrayElementType)),
                        _ => return Err(SignatureError::new(DictEndedButNotStarted)),
                    }

                    match fields[depth] {
                        0 => return Err(SignatureError::new(DictEntryHasNoFields)),
                        1 => return Err(SignatureError::new(DictEntryHasOnlyOneField)),
                        2 => {}
                        _ => return Err(SignatureError::new(DictEntryHasTooManyFields)),
                    }

                    if depth == 0 || kinds[depth - 1] != ARRAY {
                        return Err(SignatureError::new(DictEntryNotInsideArray));
                    }
                }
                _ => return Err(SignatureError::new(UnknownTypeCode(t.get()))),
            }

            is_basic = false;
        }

        // A complete type also completes any arrays expecting an element
        // type.
        while depth > 0 && kinds[depth - 1] == ARRAY {
            depth -= 1;
            arrays -= 1;
            is_basic = false;
        }

        if depth > 0 {
            if kinds[depth - 1] == DICT && fields[depth - 1] == 0 && !is_basic {
                return Err(SignatureError::new(DictKeyMustBeBasicType));
            }

            if fields[depth - 1] < u8::MAX {
                fields[depth - 1] += 1;
            }
        }
    }

    if depth > 0 {
        let err = match kinds[depth - 1] {
            ARRAY => MissingArrayElementType,
            STRUCT => StructStartedButNotEnded,
            _ => DictStartedButNotEnded,
        };

        return Err(SignatureError::new(err));
    }

    Ok(())
}
