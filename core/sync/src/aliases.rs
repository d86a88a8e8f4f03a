//! Cross-environment top-level folder name resolution.
//!
//! Different producers name the three canonical roots differently: Chrome
//! has a "Bookmarks bar", Edge a "Favorites bar", and localized builds use
//! their own spellings. The table below groups the known spellings of each
//! canonical root; resolution maps a snapshot's root name onto whichever
//! spelling the destination uses.
//!
//! Matching is case-sensitive and exact. The table is closed and symmetric:
//! every key's variant list contains all spellings of its group, including
//! the key itself.

use marksync_bookmarks::StoreNode;

/// Known equivalent spellings for a top-level folder name.
///
/// Returns `None` for names outside the three canonical groups, e.g. fully
/// custom profile roots.
pub fn alias_variants(name: &str) -> Option<&'static [&'static str]> {
    let variants: &'static [&'static str] = match name {
        // Chrome, Simplified Chinese
        "书签栏" => &["收藏夹栏", "Bookmarks bar", "Favorites bar", "书签栏"],
        "其他书签" => &["其他收藏夹", "Other bookmarks", "Other favorites", "其他书签"],
        "移动设备书签" => &[
            "移动设备收藏夹",
            "Mobile bookmarks",
            "Mobile favorites",
            "移动设备书签",
        ],
        // Edge, Simplified Chinese
        "收藏夹栏" => &["书签栏", "Bookmarks bar", "Favorites bar", "收藏夹栏"],
        "其他收藏夹" => &["其他书签", "Other bookmarks", "Other favorites", "其他收藏夹"],
        "移动设备收藏夹" => &[
            "移动设备书签",
            "Mobile bookmarks",
            "Mobile favorites",
            "移动设备收藏夹",
        ],
        // Chrome, English
        "Bookmarks bar" => &["Favorites bar", "书签栏", "收藏夹栏", "Bookmarks bar"],
        "Other bookmarks" => &["Other favorites", "其他书签", "其他收藏夹", "Other bookmarks"],
        "Mobile bookmarks" => &[
            "Mobile favorites",
            "移动设备书签",
            "移动设备收藏夹",
            "Mobile bookmarks",
        ],
        // Edge, English
        "Favorites bar" => &["Bookmarks bar", "书签栏", "收藏夹栏", "Favorites bar"],
        "Other favorites" => &["Other bookmarks", "其他书签", "其他收藏夹", "Other favorites"],
        "Mobile favorites" => &[
            "Mobile bookmarks",
            "移动设备书签",
            "移动设备收藏夹",
            "Mobile favorites",
        ],
        _ => return None,
    };
    Some(variants)
}

/// Find the destination top-level folder matching a snapshot root name.
///
/// Tries, in order: an exact name match, the name's own alias list, and a
/// reverse scan checking whether any destination folder's alias list
/// contains the snapshot name. Returns `None` when nothing matches; the
/// caller skips that subtree.
pub fn resolve_top_folder<'a>(
    snapshot_name: &str,
    destination: &'a [StoreNode],
) -> Option<&'a StoreNode> {
    resolve_with(alias_variants, snapshot_name, destination)
}

fn resolve_with<'a, F>(
    lookup: F,
    snapshot_name: &str,
    destination: &'a [StoreNode],
) -> Option<&'a StoreNode>
where
    F: Fn(&str) -> Option<&'static [&'static str]>,
{
    if let Some(found) = destination.iter().find(|node| node.title == snapshot_name) {
        return Some(found);
    }

    if let Some(variants) = lookup(snapshot_name) {
        for variant in variants {
            if let Some(found) = destination.iter().find(|node| node.title == *variant) {
                return Some(found);
            }
        }
    }

    destination.iter().find(|node| {
        lookup(&node.title)
            .map(|variants| variants.contains(&snapshot_name))
            .unwrap_or(false)
    })
}
