package sorts.custom;

use sort_catalog::{ModuleDeclaration, Namespace};

fn register(_ns: &mut Namespace) -> sort_catalog::Result<()> {
    Ok(())
}

#[no_mangle]
pub static SORT_CATALOG_MODULE: ModuleDeclaration = ModuleDeclaration {
    catalog_version: "99.0.0",
    register,
    construct: sort_catalog::bridge::loader::guarded_construct,
};
