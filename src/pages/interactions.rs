use super::{menu_item, nth};
use crate::core::{BoundingBox, BrowserDriver};
use crate::errors::Result;
use crate::sync::Synchronizer;
use tracing::debug;

pub struct InteractionsSelectors {
    pub group: &'static str,

    pub list_tab: &'static str,
    pub grid_tab: &'static str,
    pub sortable_list_items: &'static str,
    pub sortable_grid_items: &'static str,

    pub selectable_list_items: &'static str,
    pub selectable_grid_items: &'static str,

    pub resizable_box: &'static str,
    pub resize_handle: &'static str,

    pub accept_tab: &'static str,
    pub prevent_tab: &'static str,
    pub simple_draggable: &'static str,
    pub simple_droppable: &'static str,
    pub acceptable: &'static str,
    pub not_acceptable: &'static str,
    pub accept_droppable: &'static str,
    pub prevent_draggable: &'static str,
    pub outer_drop_box: &'static str,
    pub inner_drop_box: &'static str,

    pub drag_box: &'static str,
    pub axis_tab: &'static str,
    pub container_tab: &'static str,
    pub restricted_x: &'static str,
    pub restricted_y: &'static str,
    pub container: &'static str,
    pub contained_box: &'static str,
}

pub static INTERACTIONS: InteractionsSelectors = InteractionsSelectors {
    group: "Interactions",

    list_tab: "#demo-tab-list",
    grid_tab: "#demo-tab-grid",
    sortable_list_items: "#demo-tabpane-list .list-group-item",
    sortable_grid_items: ".grid-container .list-group-item",

    selectable_list_items: "#verticalListContainer li",
    selectable_grid_items: "#gridContainer li",

    resizable_box: "#resizableBoxWithRestriction",
    resize_handle: "#resizableBoxWithRestriction .react-resizable-handle",

    accept_tab: "#droppableExample-tab-accept",
    prevent_tab: "#droppableExample-tab-preventPropogation",
    simple_draggable: "#simpleDropContainer #draggable",
    simple_droppable: "#simpleDropContainer #droppable",
    acceptable: "#acceptable",
    not_acceptable: "#notAcceptable",
    accept_droppable: "#acceptDropContainer #droppable",
    prevent_draggable: "#ppDropContainer #dragBox",
    outer_drop_box: "#notGreedyDropBox",
    inner_drop_box: "#notGreedyInnerDropBox",

    drag_box: "#dragBox",
    axis_tab: "#draggableExample-tab-axisRestriction",
    container_tab: "#draggableExample-tab-containerRestriction",
    restricted_x: "#restrictedX",
    restricted_y: "#restrictedY",
    container: "#containmentWrapper",
    contained_box: "#containmentWrapper .draggable",
};

pub struct InteractionsPage<D: BrowserDriver> {
    sync: Synchronizer<D>,
    sel: &'static InteractionsSelectors,
}

impl<D: BrowserDriver> InteractionsPage<D> {
    pub fn new(sync: Synchronizer<D>) -> Self {
        Self {
            sync,
            sel: &INTERACTIONS,
        }
    }

    pub fn selectors(&self) -> &'static InteractionsSelectors {
        self.sel
    }

    pub fn sync(&self) -> &Synchronizer<D> {
        &self.sync
    }

    pub async fn open(&self) -> Result<()> {
        self.sync.navigate("/interaction").await
    }

    async fn open_menu(&self, item: &str) -> Result<()> {
        self.sync.click(&menu_item(self.sel.group, item)).await?;
        Ok(())
    }

    async fn click(&self, raw: &str) -> Result<()> {
        self.sync.click(raw).await?;
        Ok(())
    }

    pub async fn navigate_to_sortable(&self) -> Result<()> {
        self.open_menu("Sortable").await
    }

    pub async fn navigate_to_selectable(&self) -> Result<()> {
        self.open_menu("Selectable").await
    }

    pub async fn navigate_to_resizable(&self) -> Result<()> {
        self.open_menu("Resizable").await
    }

    pub async fn navigate_to_droppable(&self) -> Result<()> {
        self.open_menu("Droppable").await
    }

    /// The sidebar entry is spelled "Dragabble" on the site.
    pub async fn navigate_to_draggable(&self) -> Result<()> {
        self.open_menu("Dragabble").await
    }

    // Sortable and selectable share the list/grid tab pair.

    pub async fn switch_to_list_view(&self) -> Result<()> {
        self.click(self.sel.list_tab).await
    }

    pub async fn switch_to_grid_view(&self) -> Result<()> {
        self.click(self.sel.grid_tab).await
    }

    pub async fn drag_list_item(&self, from: usize, to: usize) -> Result<()> {
        debug!(from, to, "sorting list item");
        self.sync
            .drag_and_drop(
                &nth(self.sel.sortable_list_items, from),
                &nth(self.sel.sortable_list_items, to),
            )
            .await
    }

    pub async fn drag_grid_item(&self, from: usize, to: usize) -> Result<()> {
        debug!(from, to, "sorting grid item");
        self.sync
            .drag_and_drop(
                &nth(self.sel.sortable_grid_items, from),
                &nth(self.sel.sortable_grid_items, to),
            )
            .await
    }

    pub async fn list_order(&self) -> Result<Vec<String>> {
        self.sync
            .all_text_contents(self.sel.sortable_list_items)
            .await
    }

    pub async fn grid_order(&self) -> Result<Vec<String>> {
        self.sync
            .all_text_contents(self.sel.sortable_grid_items)
            .await
    }

    pub async fn select_list_items(&self, indexes: &[usize]) -> Result<()> {
        for &index in indexes {
            self.click(&nth(self.sel.selectable_list_items, index))
                .await?;
        }
        Ok(())
    }

    pub async fn select_grid_items(&self, indexes: &[usize]) -> Result<()> {
        for &index in indexes {
            self.click(&nth(self.sel.selectable_grid_items, index))
                .await?;
        }
        Ok(())
    }

    // Resizable

    /// Drags the restricted box's corner handle by `dx`/`dy` pixels.
    pub async fn resize_box(&self, dx: f64, dy: f64) -> Result<()> {
        self.sync
            .drag_by_offset(self.sel.resize_handle, dx, dy)
            .await
    }

    pub async fn box_size(&self) -> Result<BoundingBox> {
        self.sync.bounding_box(self.sel.resizable_box).await
    }

    // Droppable

    pub async fn switch_to_accept_tab(&self) -> Result<()> {
        self.click(self.sel.accept_tab).await
    }

    pub async fn switch_to_prevent_tab(&self) -> Result<()> {
        self.click(self.sel.prevent_tab).await
    }

    pub async fn drag_to_droppable(&self) -> Result<()> {
        self.sync
            .drag_and_drop(self.sel.simple_draggable, self.sel.simple_droppable)
            .await
    }

    pub async fn drag_to_accept_target(&self, acceptable: bool) -> Result<()> {
        let source = if acceptable {
            self.sel.acceptable
        } else {
            self.sel.not_acceptable
        };
        self.sync
            .drag_and_drop(source, self.sel.accept_droppable)
            .await
    }

    /// Drops into the outer box, or into the inner box nested inside it.
    pub async fn drag_to_nested_target(&self, inner: bool) -> Result<()> {
        let target = if inner {
            self.sel.inner_drop_box
        } else {
            self.sel.outer_drop_box
        };
        self.sync
            .drag_and_drop(self.sel.prevent_draggable, target)
            .await
    }

    // Draggable

    pub async fn drag_by_offset(&self, dx: f64, dy: f64) -> Result<()> {
        self.sync.drag_by_offset(self.sel.drag_box, dx, dy).await
    }

    pub async fn switch_to_axis_restricted_tab(&self) -> Result<()> {
        self.click(self.sel.axis_tab).await
    }

    pub async fn switch_to_container_restricted_tab(&self) -> Result<()> {
        self.click(self.sel.container_tab).await
    }

    pub async fn drag_restricted_x(&self, dx: f64, dy: f64) -> Result<()> {
        self.sync
            .drag_by_offset(self.sel.restricted_x, dx, dy)
            .await
    }

    pub async fn drag_restricted_y(&self, dx: f64, dy: f64) -> Result<()> {
        self.sync
            .drag_by_offset(self.sel.restricted_y, dx, dy)
            .await
    }

    pub async fn drag_within_container(&self, dx: f64, dy: f64) -> Result<()> {
        self.sync
            .drag_by_offset(self.sel.contained_box, dx, dy)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MouseAction;
    use crate::testing::MockDriver;

    #[tokio::test(start_paused = true)]
    async fn sorting_drags_between_item_centers() {
        let mock = MockDriver::new();
        mock.element(&nth(INTERACTIONS.sortable_list_items, 0))
            .bbox(0.0, 0.0, 200.0, 40.0);
        mock.element(&nth(INTERACTIONS.sortable_list_items, 2))
            .bbox(0.0, 80.0, 200.0, 40.0);
        let page = InteractionsPage::new(mock.synchronizer());

        page.drag_list_item(0, 2).await.unwrap();

        let actions = mock.mouse_actions();
        assert_eq!(actions[0], MouseAction::Move { x: 100.0, y: 20.0 });
        assert_eq!(actions[1], MouseAction::Down);
        assert_eq!(
            actions[actions.len() - 2],
            MouseAction::Move { x: 100.0, y: 100.0 }
        );
        assert_eq!(actions.last(), Some(&MouseAction::Up));
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_clicks_each_index() {
        let mock = MockDriver::new();
        for i in [0, 4, 8] {
            mock.element(&nth(INTERACTIONS.selectable_grid_items, i));
        }
        let page = InteractionsPage::new(mock.synchronizer());

        page.select_grid_items(&[0, 4, 8]).await.unwrap();

        for i in [0, 4, 8] {
            assert_eq!(mock.clicks_on(&nth(INTERACTIONS.selectable_grid_items, i)), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resize_drags_the_handle() {
        let mock = MockDriver::new();
        mock.element(INTERACTIONS.resize_handle)
            .bbox(190.0, 190.0, 10.0, 10.0);
        let page = InteractionsPage::new(mock.synchronizer());

        page.resize_box(50.0, 50.0).await.unwrap();

        let actions = mock.mouse_actions();
        assert_eq!(actions[0], MouseAction::Move { x: 195.0, y: 195.0 });
        assert_eq!(
            actions[actions.len() - 2],
            MouseAction::Move { x: 245.0, y: 245.0 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drop_fails_without_target() {
        let mock = MockDriver::new();
        mock.element(INTERACTIONS.simple_draggable);
        let sync = mock.synchronizer_with(crate::core::Config {
            timeouts: crate::core::config::TimeoutConfig {
                default_ms: 1_000,
                ..Default::default()
            },
            ..Default::default()
        });
        let page = InteractionsPage::new(sync);

        let err = page.drag_to_droppable().await.unwrap_err();
        assert!(err.is_timeout());
        assert!(mock.mouse_actions().is_empty());
    }
}
