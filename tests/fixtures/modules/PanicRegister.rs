package sorts.custom;

use sort_catalog::Namespace;

fn register(_ns: &mut Namespace) -> sort_catalog::Result<()> {
    panic!("registry exploded")
}

sort_catalog::declare_sort_module!(register);
