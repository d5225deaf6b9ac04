//! Generic package decoding
//!
//! A package is a `(size, type, data)` header. Scalar tags mean `data`
//! holds `size` values of exactly that width; the list tag means `data`
//! holds `size` pointers to further packages.

use libc::{c_int, c_long, c_uint, c_ulong};

use super::error::{MarshalError, MarshalResult};
use super::handle::PackageHandle;
use super::layout::PackageHeader;
use super::types::{NestedValue, Scalar, ScalarKind, TypeTag};

impl PackageHandle<'_> {
    /// Decode the package into host values. A null handle yields `[]`.
    ///
    /// Foreign memory is only read; release happens when the guard goes.
    pub fn decode(&self) -> MarshalResult<NestedValue> {
        let result = match self.record() {
            // Safety: the guard owns a live, engine-built package tree.
            Some(header) => unsafe { decode_header(header) },
            None => Ok(NestedValue::empty()),
        };
        match &result {
            Ok(value) => tracing::debug!(depth = value.depth(), "decoded package"),
            Err(e) => tracing::warn!(error = %e, "package decoding failed"),
        }
        result
    }

    /// Decode, then release regardless of the outcome.
    pub fn decode_and_release(self) -> MarshalResult<NestedValue> {
        self.decode()
    }
}

/// Decode a package tree that may start at a null pointer.
///
/// # Safety
///
/// `ptr` must be null or point to a well-formed package whose data and
/// sub-packages stay alive for the duration of the call.
pub(crate) unsafe fn decode_package_ptr(ptr: *const PackageHeader) -> MarshalResult<NestedValue> {
    match ptr.as_ref() {
        Some(header) => decode_header(header),
        None => Ok(NestedValue::empty()),
    }
}

unsafe fn decode_header(header: &PackageHeader) -> MarshalResult<NestedValue> {
    let tag = TypeTag::from_code(header.type_)?;
    let len = header.size as usize;

    if len == 0 {
        return Ok(NestedValue::empty());
    }
    if header.data.is_null() {
        return Err(MarshalError::MalformedPackage(format!(
            "{} package declares {} elements but has no data",
            tag, len
        )));
    }

    let items = match tag {
        TypeTag::Scalar(kind) => read_scalars(kind, header.data.cast_const(), len),
        TypeTag::List => {
            let children =
                std::slice::from_raw_parts(header.data.cast_const() as *const *const PackageHeader, len);
            children
                .iter()
                .map(|&child| decode_package_ptr(child))
                .collect::<MarshalResult<Vec<_>>>()?
        }
    };

    Ok(NestedValue::List(items))
}

unsafe fn read_scalars(kind: ScalarKind, data: *const libc::c_void, len: usize) -> Vec<NestedValue> {
    match kind {
        ScalarKind::Int => read_run::<c_int>(data, len, |v| Scalar::Int(v as i32)),
        ScalarKind::UInt => read_run::<c_uint>(data, len, |v| Scalar::UInt(v as u32)),
        ScalarKind::Float => read_run::<f32>(data, len, Scalar::Float),
        ScalarKind::Double => read_run::<f64>(data, len, Scalar::Double),
        ScalarKind::Long => read_run::<c_long>(data, len, |v| Scalar::Long(v as i64)),
        ScalarKind::ULong => read_run::<c_ulong>(data, len, |v| Scalar::ULong(v as u64)),
    }
}

/// Read `len` values of exactly `T`'s width.
unsafe fn read_run<T: Copy>(
    data: *const libc::c_void,
    len: usize,
    wrap: impl Fn(T) -> Scalar,
) -> Vec<NestedValue> {
    std::slice::from_raw_parts(data as *const T, len)
        .iter()
        .map(|&v| NestedValue::Scalar(wrap(v)))
        .collect()
}
