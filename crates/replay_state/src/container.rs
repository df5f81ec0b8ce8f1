use replay_protocol::Object;

/// An open container window. `items` is the current page; `total_objects`
/// is the full logical size when the container paginates.
#[derive(Clone, Default, Debug)]
pub struct Container {
    pub item_id: u16,
    pub mark: u8,
    pub animation: u8,
    pub name: String,

    pub slots_per_page: u8,
    pub has_parent: bool,
    pub drag_and_drop: bool,
    pub pagination: bool,
    pub total_objects: u16,
    pub start_index: u16,

    pub items: Vec<Object>,
}

impl Container {
    /// Adds an item at an absolute index, shifting the page's tail. Items
    /// landing before the current page only bump the totals.
    pub fn add_item(&mut self, container_index: u16, item: Object) {
        if container_index >= self.start_index {
            let insertion_index = usize::from(container_index - self.start_index);

            if insertion_index <= self.items.len() {
                self.items.insert(insertion_index, item);
                self.items.truncate(usize::from(self.slots_per_page));
            }
        }

        self.total_objects += 1;
    }

    pub fn transform_item(&mut self, container_index: u16, item: Object) {
        let Some(index) = usize::from(container_index).checked_sub(usize::from(self.start_index))
        else {
            return;
        };

        if let Some(slot) = self.items.get_mut(index) {
            *slot = item;
        }
    }

    /// Removes the item at an absolute index. When the server backfills the
    /// page (paginated containers), the backfill object slides onto the last
    /// slot so the page stays full.
    pub fn remove_item(&mut self, container_index: u16, backfill: Object) {
        if let Some(index) =
            usize::from(container_index).checked_sub(usize::from(self.start_index))
        {
            if index < self.items.len() {
                self.items.remove(index);

                if backfill != Object::None {
                    self.items.push(backfill);
                }
            }
        }

        self.total_objects = self.total_objects.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use replay_protocol::Item;

    use super::*;

    fn item(id: u16) -> Object {
        Object::Item(Item {
            id,
            ..Item::default()
        })
    }

    fn container() -> Container {
        Container {
            slots_per_page: 4,
            total_objects: 3,
            items: vec![item(1), item(2), item(3)],
            ..Container::default()
        }
    }

    #[test]
    fn adds_shift_the_page_tail() {
        let mut container = container();
        container.add_item(1, item(9));

        assert_eq!(
            container.items,
            vec![item(1), item(9), item(2), item(3)]
        );
        assert_eq!(container.total_objects, 4);
    }

    #[test]
    fn full_pages_drop_the_last_item_on_add() {
        let mut container = container();
        container.items.push(item(4));

        container.add_item(0, item(9));
        assert_eq!(container.items.len(), 4);
        assert_eq!(container.items[0], item(9));
    }

    #[test]
    fn removal_backfills_paginated_pages() {
        let mut container = container();
        container.pagination = true;
        container.items.push(item(4));

        container.remove_item(1, item(77));
        assert_eq!(
            container.items,
            vec![item(1), item(3), item(4), item(77)]
        );
        assert_eq!(container.total_objects, 2);
    }

    #[test]
    fn indexes_before_the_page_only_touch_totals() {
        let mut container = container();
        container.start_index = 8;
        container.total_objects = 11;

        container.add_item(2, item(9));
        assert_eq!(container.items.len(), 3);
        assert_eq!(container.total_objects, 12);

        container.remove_item(2, Object::None);
        assert_eq!(container.items.len(), 3);
        assert_eq!(container.total_objects, 11);
    }
}
