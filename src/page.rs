//! The single page served at `/`. Markup and script only; every decision
//! (prompt text, state resets, coordinate mapping) lives on the Rust side
//! and the page just posts actions and re-renders the returned state.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Moodboard Studio</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: linear-gradient(135deg, #2b2d42 0%, #5c4d7d 100%);
            min-height: 100vh;
            padding: 30px 20px;
            color: #333;
        }

        .container {
            background: white;
            border-radius: 16px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.35);
            max-width: 960px;
            margin: 0 auto;
            padding: 36px;
        }

        h1 { font-size: 1.8em; margin-bottom: 4px; }
        .subtitle { color: #666; margin-bottom: 24px; font-size: 0.9em; }

        .controls { display: flex; gap: 12px; flex-wrap: wrap; margin-bottom: 20px; align-items: center; }
        select, textarea {
            border: 2px solid #d6d3e8;
            border-radius: 8px;
            padding: 10px;
            font-size: 0.95em;
        }
        textarea { flex: 1; min-width: 220px; resize: vertical; min-height: 44px; }

        .uploads { display: flex; gap: 16px; margin-bottom: 20px; }
        .upload-area {
            flex: 1;
            border: 3px dashed #5c4d7d;
            border-radius: 12px;
            padding: 28px 16px;
            text-align: center;
            cursor: pointer;
            background: #f7f6fc;
        }
        .upload-area.dragover { background: #ece8f8; }
        .upload-area img { max-width: 100%; max-height: 180px; border-radius: 8px; }
        .upload-hint { color: #888; font-size: 0.85em; margin-top: 8px; }
        input[type="file"] { display: none; }

        button {
            background: #5c4d7d;
            color: white;
            border: none;
            border-radius: 8px;
            padding: 10px 18px;
            font-size: 0.95em;
            font-weight: 600;
            cursor: pointer;
        }
        button:disabled { background: #b8b2c9; cursor: default; }

        .panel {
            background: #f7f6fc;
            border-radius: 12px;
            padding: 18px;
            margin-top: 20px;
        }
        .panel h2 { font-size: 1.05em; color: #5c4d7d; margin-bottom: 10px; }
        .panel img.board { max-width: 100%; border-radius: 8px; cursor: crosshair; }
        .panel img.plain { max-width: 100%; border-radius: 8px; }
        .panel .text { margin-top: 10px; line-height: 1.5; white-space: pre-wrap; }
        .panel .actions { margin-top: 12px; display: flex; gap: 10px; flex-wrap: wrap; }
        .error { color: #b3261e; background: #fdecea; border-radius: 8px; padding: 10px; margin-top: 10px; }
        .busy { color: #5c4d7d; font-style: italic; margin-top: 10px; }
        .hidden { display: none; }

        .details-grid { display: grid; grid-template-columns: 1fr 2fr; gap: 16px; margin-top: 10px; }
        .details-grid dl { font-size: 0.9em; }
        .details-grid dt { font-weight: 600; color: #5c4d7d; margin-top: 8px; }
        ul.similar { margin-top: 10px; padding-left: 20px; }
        ul.similar li { margin-bottom: 6px; }
    </style>
</head>
<body>
    <div class="container">
        <h1>🎨 Moodboard Studio</h1>
        <p class="subtitle">Upload an image, generate an annotated mood board, click any element for details and shopping links.</p>

        <div class="controls">
            <select id="category">
                <option value="GENERAL">General</option>
                <option value="PRODUCT">Product</option>
                <option value="FASHION">Fashion</option>
                <option value="FOOD">Food</option>
                <option value="ARCHITECTURE">Architecture</option>
                <option value="DESIGN">Design</option>
                <option value="TRY_ON">Outfit try-on (two images)</option>
                <option value="STAGING">Product staging (two images)</option>
            </select>
            <textarea id="instructions" placeholder="Optional instructions…"></textarea>
        </div>

        <div class="uploads">
            <div class="upload-area" id="primaryArea">
                <div id="primaryEmpty">📸 Click or drop the main image</div>
                <img id="primaryPreview" class="hidden" alt="">
                <div class="upload-hint">JPG, PNG, WebP</div>
                <input type="file" id="primaryInput" accept="image/*">
            </div>
            <div class="upload-area hidden" id="secondaryArea">
                <div id="secondaryEmpty">🖼️ Click or drop the second image</div>
                <img id="secondaryPreview" class="hidden" alt="">
                <div class="upload-hint">Person / background</div>
                <input type="file" id="secondaryInput" accept="image/*">
            </div>
        </div>

        <div class="controls">
            <button id="generateBtn">Generate mood board</button>
            <button id="compositeBtn" class="hidden">Generate composite</button>
        </div>

        <div class="panel hidden" id="moodboardPanel">
            <h2>Mood board <span class="upload-hint">(click an element for details)</span></h2>
            <img id="moodboardImage" class="board" alt="Mood board">
            <div class="text" id="moodboardText"></div>
            <div class="actions">
                <button id="enhanceBtn">Enhance resolution</button>
                <a id="moodboardDownload" href="/api/download/moodboard"><button>Download</button></a>
            </div>
        </div>
        <div class="busy hidden" id="moodboardBusy">Generating mood board…</div>
        <div class="error hidden" id="moodboardError"></div>

        <div class="panel hidden" id="enhancedPanel">
            <h2>Enhanced</h2>
            <img id="enhancedImage" class="plain" alt="Enhanced">
            <div class="actions">
                <a href="/api/download/enhanced"><button>Download</button></a>
            </div>
        </div>
        <div class="busy hidden" id="enhancedBusy">Enhancing…</div>
        <div class="error hidden" id="enhancedError"></div>

        <div class="panel hidden" id="detailsPanel">
            <h2>Element details</h2>
            <div class="details-grid">
                <img id="detailsCrop" class="plain" alt="Element crop">
                <dl id="detailsFields"></dl>
            </div>
            <div class="actions">
                <button id="similarBtn">Find similar items</button>
            </div>
        </div>
        <div class="busy hidden" id="detailsBusy">Analyzing element…</div>
        <div class="error hidden" id="detailsError"></div>

        <div class="panel hidden" id="similarPanel">
            <h2>Similar items</h2>
            <ul class="similar" id="similarList"></ul>
        </div>
        <div class="busy hidden" id="similarBusy">Searching…</div>
        <div class="error hidden" id="similarError"></div>

        <div class="panel hidden" id="compositePanel">
            <h2>Composite</h2>
            <img id="compositeImage" class="plain" alt="Composite">
            <div class="actions">
                <a href="/api/download/composite"><button>Download</button></a>
            </div>
        </div>
        <div class="busy hidden" id="compositeBusy">Compositing…</div>
        <div class="error hidden" id="compositeError"></div>
    </div>

    <script>
        const $ = (id) => document.getElementById(id);
        const show = (id, on) => $(id).classList.toggle('hidden', !on);

        async function getState() {
            const res = await fetch('/api/state');
            render(await res.json());
        }

        async function post(url, body) {
            const res = await fetch(url, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(body || {})
            });
            const payload = await res.json();
            if (payload.state) render(payload.state);
            else if (!res.ok && payload.error) { await getState(); }
        }

        function renderSlot(name, onResult) {
            return (slot) => {
                show(name + 'Busy', slot.in_progress);
                show(name + 'Error', !!slot.error);
                if (slot.error) $(name + 'Error').textContent = slot.error;
                show(name + 'Panel', !!slot.result);
                if (slot.result) onResult(slot.result);
            };
        }

        const renderers = {
            moodboard: renderSlot('moodboard', (r) => {
                $('moodboardImage').src = r.image;
                $('moodboardText').textContent = r.text;
            }),
            enhanced: renderSlot('enhanced', (r) => { $('enhancedImage').src = r; }),
            details: renderSlot('details', (r) => {
                $('detailsCrop').src = r.crop;
                const d = r.details;
                const rows = [
                    ['Name', d.name], ['Type', d.elementType],
                    ['Category', [d.category, d.subcategory].filter(Boolean).join(' / ')],
                    ['Style', [d.style.era, d.style.aesthetic].filter(Boolean).join(', ')],
                    ['Materials', d.materials.join(', ')], ['Colors', d.colors.join(', ')],
                    ['Description', d.description],
                    ['Market', [d.market.estimatedPriceRange, d.market.availability].filter(Boolean).join(' — ')],
                    ['Pairs well with', d.recommendations.pairsWellWith.join(', ')]
                ];
                $('detailsFields').innerHTML = rows
                    .filter(([, v]) => v)
                    .map(([k, v]) => `<dt>${k}</dt><dd>${v}</dd>`).join('');
            }),
            similar: renderSlot('similar', (items) => {
                $('similarList').innerHTML = items.length
                    ? items.map(i => `<li><a href="${i.uri}" target="_blank" rel="noopener">${i.title}</a></li>`).join('')
                    : '<li>No results found.</li>';
            }),
            composite: renderSlot('composite', (r) => { $('compositeImage').src = r.image; })
        };

        function render(state) {
            const twoImage = state.category === 'TRY_ON' || state.category === 'STAGING';
            $('category').value = state.category;
            show('secondaryArea', twoImage);
            show('compositeBtn', twoImage);
            for (const [slot, img, empty] of [
                ['primary_preview', 'primaryPreview', 'primaryEmpty'],
                ['secondary_preview', 'secondaryPreview', 'secondaryEmpty']
            ]) {
                const uri = state[slot];
                show(img, !!uri);
                show(empty, !uri);
                if (uri) $(img).src = uri;
            }
            for (const name of Object.keys(renderers)) renderers[name](state[name]);
        }

        function wireUpload(area, input, slot) {
            $(area).addEventListener('click', () => $(input).click());
            $(area).addEventListener('dragover', (e) => { e.preventDefault(); $(area).classList.add('dragover'); });
            $(area).addEventListener('dragleave', () => $(area).classList.remove('dragover'));
            $(area).addEventListener('drop', (e) => {
                e.preventDefault();
                $(area).classList.remove('dragover');
                if (e.dataTransfer.files[0]) upload(e.dataTransfer.files[0], slot);
            });
            $(input).addEventListener('change', (e) => {
                if (e.target.files[0]) upload(e.target.files[0], slot);
            });
        }

        async function upload(file, slot) {
            const form = new FormData();
            form.append('image', file);
            await fetch(`/api/upload?slot=${slot}`, { method: 'POST', body: form });
            await getState();
        }

        wireUpload('primaryArea', 'primaryInput', 'primary');
        wireUpload('secondaryArea', 'secondaryInput', 'secondary');

        $('category').addEventListener('change', (e) => post('/api/category', { category: e.target.value }));
        $('generateBtn').addEventListener('click', () =>
            post('/api/moodboard', { instructions: $('instructions').value }));
        $('compositeBtn').addEventListener('click', () =>
            post('/api/composite', { instructions: $('instructions').value }));
        $('enhanceBtn').addEventListener('click', () => post('/api/enhance'));
        $('similarBtn').addEventListener('click', () => post('/api/similar'));

        $('moodboardImage').addEventListener('click', (e) => {
            const rect = e.target.getBoundingClientRect();
            post('/api/select', {
                x: e.clientX - rect.left,
                y: e.clientY - rect.top,
                display_width: rect.width,
                display_height: rect.height
            });
        });

        getState();
    </script>
</body>
</html>
"#;
