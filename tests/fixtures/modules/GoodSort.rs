package sorts.custom;

use sort_catalog::{ConstructResult, ContextHandle, Namespace, ProfiledSort, SortAxis, SortProfile};

fn build(ctx: ContextHandle) -> ConstructResult {
    Ok(Box::new(ProfiledSort::new(
        ctx,
        SortProfile::new("Good", "Good Sort", "Good sort", "Custom Sorts", SortAxis::Comparison),
    )))
}

fn register(ns: &mut Namespace) -> sort_catalog::Result<()> {
    ns.register("sorts.custom.GoodSort", build)
}

sort_catalog::declare_sort_module!(register);
