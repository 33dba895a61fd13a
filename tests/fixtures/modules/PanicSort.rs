package sorts.custom;

use sort_catalog::{ConstructResult, ContextHandle, Namespace};

fn build(_ctx: ContextHandle) -> ConstructResult {
    panic!("visualizer went away")
}

fn register(ns: &mut Namespace) -> sort_catalog::Result<()> {
    ns.register("sorts.custom.PanicSort", build)
}

sort_catalog::declare_sort_module!(register);
